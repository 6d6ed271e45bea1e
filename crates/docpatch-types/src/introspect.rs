//! The [`Introspect`] capability and its implementations for standard types.
//!
//! Structs opt in through [`StructNode`] or the [`introspect_struct!`]
//! macro:
//!
//! ```
//! use docpatch_types::{introspect_struct, Introspect, NodeKind};
//!
//! struct User {
//!     id: u64,
//!     name: String,
//!     password_hash: String,
//! }
//!
//! introspect_struct!(User {
//!     id => "_id",
//!     name,
//!     password_hash => "-",
//! });
//!
//! let user = User { id: 7, name: "ann".into(), password_hash: "x".into() };
//! assert!(matches!(user.introspect().kind, NodeKind::Struct(_)));
//! ```
//!
//! Heap indirections (`Box`, `Rc`, `Arc`) are pointers and carry the pointee
//! address. Plain references are transparent. `Option<T>` is a nullable
//! pointer without an address; `Option` over a heap indirection collapses
//! into a single nullable pointer.

use std::any::type_name;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::BuildHasher;
use std::mem;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};

use crate::node::{Field, Node, NodeKind, Pointer};

/// Produce a runtime description of a value.
pub trait Introspect {
    fn introspect(&self) -> Node;
}

fn node_of<T: ?Sized>(kind: NodeKind) -> Node {
    Node::new(type_name::<T>(), kind)
}

/// Builder for struct nodes.
#[derive(Debug)]
pub struct StructNode {
    type_name: &'static str,
    fields: Vec<Field>,
}

impl StructNode {
    /// Start a struct node for type `T`.
    pub fn of<T: ?Sized>() -> Self {
        Self {
            type_name: type_name::<T>(),
            fields: Vec::new(),
        }
    }

    /// Add an untagged field.
    pub fn field<V: Introspect + ?Sized>(self, name: &'static str, value: &V) -> Self {
        self.field_with_tag(name, None, value)
    }

    /// Add a tagged field. The tag's first comma segment is the external name.
    pub fn tagged<V: Introspect + ?Sized>(
        self,
        name: &'static str,
        tag: &'static str,
        value: &V,
    ) -> Self {
        self.field_with_tag(name, Some(tag), value)
    }

    pub fn field_with_tag<V: Introspect + ?Sized>(
        mut self,
        name: &'static str,
        tag: Option<&'static str>,
        value: &V,
    ) -> Self {
        self.fields.push(Field {
            name,
            tag,
            value: value.introspect(),
        });
        self
    }

    pub fn build(self) -> Node {
        Node::new(self.type_name, NodeKind::Struct(self.fields))
    }
}

/// Implement [`Introspect`] for a struct with named fields.
///
/// Each field may carry a tag after `=>`. Fields not listed are not diffed.
#[macro_export]
macro_rules! introspect_struct {
    (@tag) => {
        ::core::option::Option::None
    };
    (@tag $tag:literal) => {
        ::core::option::Option::Some($tag)
    };
    ($ty:ty { $($field:ident $(=> $tag:literal)?),* $(,)? }) => {
        impl $crate::Introspect for $ty {
            fn introspect(&self) -> $crate::Node {
                $crate::StructNode::of::<Self>()
                    $(.field_with_tag(
                        stringify!($field),
                        $crate::introspect_struct!(@tag $($tag)?),
                        &self.$field,
                    ))*
                    .build()
            }
        }
    };
}

impl Introspect for bool {
    fn introspect(&self) -> Node {
        node_of::<Self>(NodeKind::Bool(*self))
    }
}

macro_rules! impl_signed {
    ($($t:ty),*) => {$(
        impl Introspect for $t {
            fn introspect(&self) -> Node {
                node_of::<Self>(NodeKind::Int(i64::from(*self)))
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {$(
        impl Introspect for $t {
            fn introspect(&self) -> Node {
                node_of::<Self>(NodeKind::UInt(u64::from(*self)))
            }
        }
    )*};
}

impl_signed!(i8, i16, i32, i64);
impl_unsigned!(u8, u16, u32, u64);

impl Introspect for isize {
    fn introspect(&self) -> Node {
        node_of::<Self>(NodeKind::Int(*self as i64))
    }
}

impl Introspect for usize {
    fn introspect(&self) -> Node {
        node_of::<Self>(NodeKind::UInt(*self as u64))
    }
}

impl Introspect for f32 {
    fn introspect(&self) -> Node {
        node_of::<Self>(NodeKind::Float(f64::from(*self)))
    }
}

impl Introspect for f64 {
    fn introspect(&self) -> Node {
        node_of::<Self>(NodeKind::Float(*self))
    }
}

impl Introspect for char {
    fn introspect(&self) -> Node {
        node_of::<Self>(NodeKind::String(self.to_string()))
    }
}

impl Introspect for str {
    fn introspect(&self) -> Node {
        node_of::<String>(NodeKind::String(self.to_string()))
    }
}

impl Introspect for String {
    fn introspect(&self) -> Node {
        node_of::<Self>(NodeKind::String(self.clone()))
    }
}

impl Introspect for DateTime<Utc> {
    fn introspect(&self) -> Node {
        node_of::<Self>(NodeKind::Time(*self))
    }
}

impl Introspect for DateTime<FixedOffset> {
    fn introspect(&self) -> Node {
        node_of::<Self>(NodeKind::Time(self.with_timezone(&Utc)))
    }
}

impl<T: Introspect + ?Sized> Introspect for &T {
    fn introspect(&self) -> Node {
        (**self).introspect()
    }
}

impl<T: Introspect> Introspect for [T] {
    fn introspect(&self) -> Node {
        node_of::<Self>(NodeKind::Seq(self.iter().map(Introspect::introspect).collect()))
    }
}

impl<T: Introspect> Introspect for Vec<T> {
    fn introspect(&self) -> Node {
        node_of::<Self>(NodeKind::Seq(self.iter().map(Introspect::introspect).collect()))
    }
}

impl<T: Introspect, const N: usize> Introspect for [T; N] {
    fn introspect(&self) -> Node {
        node_of::<Self>(NodeKind::Seq(self.iter().map(Introspect::introspect).collect()))
    }
}

impl<T: Introspect> Introspect for VecDeque<T> {
    fn introspect(&self) -> Node {
        node_of::<Self>(NodeKind::Seq(self.iter().map(Introspect::introspect).collect()))
    }
}

impl<V: Introspect> Introspect for BTreeMap<String, V> {
    fn introspect(&self) -> Node {
        node_of::<Self>(NodeKind::Map(
            self.iter().map(|(k, v)| (k.clone(), v.introspect())).collect(),
        ))
    }
}

impl<V: Introspect, S: BuildHasher> Introspect for HashMap<String, V, S> {
    fn introspect(&self) -> Node {
        node_of::<Self>(NodeKind::Map(
            self.iter().map(|(k, v)| (k.clone(), v.introspect())).collect(),
        ))
    }
}

impl<T: Introspect> Introspect for Option<T> {
    fn introspect(&self) -> Node {
        let kind = match self {
            None => NodeKind::Pointer(Pointer {
                address: None,
                pointee: None,
            }),
            Some(value) => {
                let inner = value.introspect();
                match inner.kind {
                    NodeKind::Pointer(pointer) => NodeKind::Pointer(pointer),
                    _ => NodeKind::Pointer(Pointer {
                        address: None,
                        pointee: Some(Box::new(inner)),
                    }),
                }
            }
        };
        node_of::<Self>(kind)
    }
}

/// Zero-sized pointees all live at the same dangling address, so they get none.
fn heap_pointer<P: ?Sized, T: Introspect + ?Sized>(target: &T) -> Node {
    let address =
        (mem::size_of_val(target) != 0).then(|| target as *const T as *const () as usize);
    node_of::<P>(NodeKind::Pointer(Pointer {
        address,
        pointee: Some(Box::new(target.introspect())),
    }))
}

impl<T: Introspect + ?Sized> Introspect for Box<T> {
    fn introspect(&self) -> Node {
        heap_pointer::<Self, T>(self.as_ref())
    }
}

impl<T: Introspect + ?Sized> Introspect for Rc<T> {
    fn introspect(&self) -> Node {
        heap_pointer::<Self, T>(self.as_ref())
    }
}

impl<T: Introspect + ?Sized> Introspect for Arc<T> {
    fn introspect(&self) -> Node {
        heap_pointer::<Self, T>(self.as_ref())
    }
}

/// Dynamic documents: each JSON variant is a distinct concrete type and
/// `null` is absence.
impl Introspect for serde_json::Value {
    fn introspect(&self) -> Node {
        use serde_json::Value as Json;
        match self {
            Json::Null => Node::new("json::null", NodeKind::Nil),
            Json::Bool(b) => Node::new("json::bool", NodeKind::Bool(*b)),
            Json::Number(n) => {
                let kind = if let Some(i) = n.as_i64() {
                    NodeKind::Int(i)
                } else if let Some(u) = n.as_u64() {
                    NodeKind::UInt(u)
                } else {
                    NodeKind::Float(n.as_f64().unwrap_or(f64::NAN))
                };
                Node::new("json::number", kind)
            }
            Json::String(s) => Node::new("json::string", NodeKind::String(s.clone())),
            Json::Array(items) => Node::new(
                "json::array",
                NodeKind::Seq(items.iter().map(Introspect::introspect).collect()),
            ),
            Json::Object(map) => Node::new(
                "json::object",
                NodeKind::Map(map.iter().map(|(k, v)| (k.clone(), v.introspect())).collect()),
            ),
        }
    }
}
