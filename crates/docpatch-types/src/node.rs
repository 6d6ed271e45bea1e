//! The introspected value tree.
//!
//! A [`Node`] is a runtime description of a value: its concrete type identity
//! and its shape. Comparators never see user types directly; they walk the
//! `Node` trees produced by [`Introspect`](crate::Introspect).
//!
//! # Invariants
//!
//! - Two nodes with the same `type_name` have the same shape, except for
//!   dynamic types (JSON numbers may be `Int`, `UInt` or `Float`).
//! - A `Struct` lists its fields in declaration order.
//! - `Pointer::address` is `Some` only for real heap indirections.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::naming::external_name;
use crate::value::{Document, Value};

/// An introspected value.
#[derive(Clone, Debug)]
pub struct Node {
    /// Concrete type identity. Differing names mean differing types.
    pub type_name: Cow<'static, str>,
    pub kind: NodeKind,
}

/// The shape of an introspected value.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Dynamic absence, such as a JSON `null`.
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    /// The time-of-day scalar. Compared as an instant, never field-walked.
    Time(DateTime<Utc>),
    Struct(Vec<Field>),
    Seq(Vec<Node>),
    /// String-keyed map.
    Map(BTreeMap<String, Node>),
    Pointer(Pointer),
}

/// One struct field.
#[derive(Clone, Debug)]
pub struct Field {
    /// The field's declared name.
    pub name: &'static str,
    /// Serialization tag, `"external_name,options"`.
    pub tag: Option<&'static str>,
    pub value: Node,
}

impl Field {
    /// The name this field has in a document, or `None` if it is tagged `-`.
    pub fn external_name(&self) -> Option<String> {
        external_name(self.name, self.tag)
    }
}

/// A nullable indirection.
#[derive(Clone, Debug)]
pub struct Pointer {
    /// Address of the pointee for heap indirections (`Box`, `Rc`, `Arc`).
    /// `None` for `Option` wrappers and zero-sized pointees.
    pub address: Option<usize>,
    pub pointee: Option<Box<Node>>,
}

impl Pointer {
    pub fn is_nil(&self) -> bool {
        self.pointee.is_none()
    }
}

impl Node {
    pub fn new(type_name: impl Into<Cow<'static, str>>, kind: NodeKind) -> Self {
        Self {
            type_name: type_name.into(),
            kind,
        }
    }

    /// Returns `true` for dynamic absence.
    pub fn is_nil(&self) -> bool {
        matches!(self.kind, NodeKind::Nil)
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.kind, NodeKind::Struct(_))
    }

    /// Leaf kinds that carry no structure of their own.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Bool(_)
                | NodeKind::Int(_)
                | NodeKind::UInt(_)
                | NodeKind::Float(_)
                | NodeKind::String(_)
                | NodeKind::Time(_)
        )
    }

    /// Follow non-nil pointers down to the first non-pointer node.
    pub fn deref(&self) -> &Node {
        let mut current = self;
        while let NodeKind::Pointer(Pointer {
            pointee: Some(inner),
            ..
        }) = &current.kind
        {
            current = inner;
        }
        current
    }

    /// Look up a struct field by declared name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        match &self.kind {
            NodeKind::Struct(fields) => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }

    /// Returns `true` if this is the zero value of its type.
    pub fn is_zero(&self) -> bool {
        match &self.kind {
            NodeKind::Nil => true,
            NodeKind::Bool(b) => !b,
            NodeKind::Int(i) => *i == 0,
            NodeKind::UInt(u) => *u == 0,
            NodeKind::Float(f) => *f == 0.0,
            NodeKind::String(s) => s.is_empty(),
            NodeKind::Time(t) => *t == DateTime::<Utc>::default(),
            NodeKind::Struct(fields) => fields.iter().all(|f| f.value.is_zero()),
            NodeKind::Seq(items) => items.is_empty(),
            NodeKind::Map(entries) => entries.is_empty(),
            NodeKind::Pointer(p) => p.is_nil(),
        }
    }

    /// The zero value with this node's type and shape.
    ///
    /// Structs keep their field list with every field zeroed; sequences and
    /// maps become empty; pointers become nil.
    pub fn zeroed(&self) -> Node {
        let kind = match &self.kind {
            NodeKind::Nil => NodeKind::Nil,
            NodeKind::Bool(_) => NodeKind::Bool(false),
            NodeKind::Int(_) => NodeKind::Int(0),
            NodeKind::UInt(_) => NodeKind::UInt(0),
            NodeKind::Float(_) => NodeKind::Float(0.0),
            NodeKind::String(_) => NodeKind::String(String::new()),
            NodeKind::Time(_) => NodeKind::Time(DateTime::<Utc>::default()),
            NodeKind::Struct(fields) => NodeKind::Struct(
                fields
                    .iter()
                    .map(|f| Field {
                        name: f.name,
                        tag: f.tag,
                        value: f.value.zeroed(),
                    })
                    .collect(),
            ),
            NodeKind::Seq(_) => NodeKind::Seq(Vec::new()),
            NodeKind::Map(_) => NodeKind::Map(BTreeMap::new()),
            NodeKind::Pointer(_) => NodeKind::Pointer(Pointer {
                address: None,
                pointee: None,
            }),
        };
        Node {
            type_name: self.type_name.clone(),
            kind,
        }
    }

    /// Semantic equality.
    ///
    /// Times compare as instants, `NaN` equals `NaN`, pointers compare by
    /// pointee, and aggregates compare element-wise. Type names are ignored;
    /// callers check type identity separately.
    pub fn same_value(&self, other: &Node) -> bool {
        use NodeKind::*;
        match (&self.kind, &other.kind) {
            (Nil, Nil) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (UInt(a), UInt(b)) => a == b,
            (Int(a), UInt(b)) | (UInt(b), Int(a)) => u64::try_from(*a).is_ok_and(|a| a == *b),
            (Float(a), Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (String(a), String(b)) => a == b,
            (Time(a), Time(b)) => a == b,
            (Struct(a), Struct(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|(x, y)| x.name == y.name && x.value.same_value(&y.value))
            }
            (Seq(a), Seq(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_value(y)),
            (Map(a), Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.same_value(w)))
            }
            (Pointer(a), Pointer(b)) => match (&a.pointee, &b.pointee) {
                (None, None) => true,
                (Some(x), Some(y)) => {
                    (a.address.is_some() && a.address == b.address) || x.same_value(y)
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Convert to a patch [`Value`].
    ///
    /// Structs become documents keyed by external field name; fields tagged
    /// `-` are left out. Nil pointers become `Null`.
    pub fn to_value(&self) -> Value {
        match &self.kind {
            NodeKind::Nil => Value::Null,
            NodeKind::Bool(b) => Value::Bool(*b),
            NodeKind::Int(i) => Value::Int(*i),
            NodeKind::UInt(u) => Value::from(*u),
            NodeKind::Float(f) => Value::Float(*f),
            NodeKind::String(s) => Value::String(s.clone()),
            NodeKind::Time(t) => Value::DateTime(*t),
            NodeKind::Struct(fields) => Value::Document(
                fields
                    .iter()
                    .filter_map(|f| f.external_name().map(|name| (name, f.value.to_value())))
                    .collect::<Document>(),
            ),
            NodeKind::Seq(items) => Value::Array(items.iter().map(Node::to_value).collect()),
            NodeKind::Map(entries) => Value::Document(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect::<Document>(),
            ),
            NodeKind::Pointer(p) => match &p.pointee {
                Some(inner) => inner.to_value(),
                None => Value::Null,
            },
        }
    }
}
