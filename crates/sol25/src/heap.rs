//! Arena for heap-allocated value payloads.
//!
//! The heap owns every string, block, and instance created during one run,
//! plus the attribute maps of the three singletons (so the whole program
//! shares one map per singleton). Slots are never freed individually; the
//! arena is dropped wholesale when the run ends.

use indexmap::IndexMap;

use crate::{
    classes::ClassId,
    error::{RunError, RunResult},
    expressions::BlockId,
    value::{Kind, Value},
};

/// A dynamic attribute map. Insertion-ordered so that attribute copying in
/// `from:` is deterministic.
pub(crate) type Attrs = IndexMap<String, Value>;

/// Identifier of a heap slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HeapId(u32);

impl HeapId {
    fn new(index: usize) -> Self {
        Self(index.try_into().expect("heap overflow"))
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Payload of one heap slot.
#[derive(Debug)]
pub(crate) enum HeapData {
    /// A UTF-8 string. The text is immutable; the attribute map is not.
    Str { text: String, attrs: Attrs },
    /// A block literal bound to the `self` captured at evaluation time.
    Block {
        block: BlockId,
        captured_self: Option<Value>,
        attrs: Attrs,
    },
    /// A user-class instance. `internal` carries the delegated primitive
    /// value for subclasses of Integer, String, or Block.
    Instance {
        class: ClassId,
        attrs: Attrs,
        internal: Option<Value>,
    },
}

#[derive(Debug)]
pub(crate) struct Heap {
    slots: Vec<HeapData>,
    nil_attrs: Attrs,
    true_attrs: Attrs,
    false_attrs: Attrs,
}

impl Heap {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            nil_attrs: Attrs::new(),
            true_attrs: Attrs::new(),
            false_attrs: Attrs::new(),
        }
    }

    fn alloc(&mut self, data: HeapData) -> Value {
        let id = HeapId::new(self.slots.len());
        self.slots.push(data);
        Value::Ref(id)
    }

    pub fn alloc_str(&mut self, text: impl Into<String>) -> Value {
        self.alloc(HeapData::Str {
            text: text.into(),
            attrs: Attrs::new(),
        })
    }

    pub fn alloc_block(&mut self, block: BlockId, captured_self: Option<Value>) -> Value {
        self.alloc(HeapData::Block {
            block,
            captured_self,
            attrs: Attrs::new(),
        })
    }

    pub fn alloc_instance(&mut self, class: ClassId, internal: Option<Value>) -> Value {
        self.alloc(HeapData::Instance {
            class,
            attrs: Attrs::new(),
            internal,
        })
    }

    fn get(&self, id: HeapId) -> &HeapData {
        &self.slots[id.index()]
    }

    /// The string payload, if the value is a String.
    pub fn as_str(&self, value: Value) -> Option<&str> {
        match value {
            Value::Ref(id) => match self.get(id) {
                HeapData::Str { text, .. } => Some(text),
                _ => None,
            },
            _ => None,
        }
    }

    /// The block payload, if the value is a Block.
    pub fn as_block(&self, value: Value) -> Option<(BlockId, Option<Value>)> {
        match value {
            Value::Ref(id) => match self.get(id) {
                HeapData::Block {
                    block, captured_self, ..
                } => Some((*block, *captured_self)),
                _ => None,
            },
            _ => None,
        }
    }

    /// The class of a user instance, if the value is one.
    pub fn instance_class(&self, value: Value) -> Option<ClassId> {
        match value {
            Value::Ref(id) => match self.get(id) {
                HeapData::Instance { class, .. } => Some(*class),
                _ => None,
            },
            _ => None,
        }
    }

    /// The delegated `__internal_value` of a user instance.
    pub fn internal_value(&self, value: Value) -> Option<Value> {
        match value {
            Value::Ref(id) => match self.get(id) {
                HeapData::Instance { internal, .. } => *internal,
                _ => None,
            },
            _ => None,
        }
    }

    /// Replaces the internal value of a user instance.
    pub fn set_internal(&mut self, value: Value, internal: Value) -> RunResult<()> {
        if let Value::Ref(id) = value
            && let HeapData::Instance { internal: slot, .. } = &mut self.slots[id.index()]
        {
            *slot = Some(internal);
            return Ok(());
        }
        Err(RunError::internal("internal value set on a non-instance"))
    }

    /// The class every message to this value resolves against.
    pub fn class_of(&self, value: Value) -> ClassId {
        match value {
            Value::Nil => ClassId::NIL,
            Value::True => ClassId::TRUE,
            Value::False => ClassId::FALSE,
            Value::Int(_) => ClassId::INTEGER,
            Value::Ref(id) => match self.get(id) {
                HeapData::Str { .. } => ClassId::STRING,
                HeapData::Block { .. } => ClassId::BLOCK,
                HeapData::Instance { class, .. } => *class,
            },
        }
    }

    pub fn kind_of(&self, value: Value) -> Kind {
        match value {
            Value::Nil => Kind::Nil,
            Value::True => Kind::True,
            Value::False => Kind::False,
            Value::Int(_) => Kind::Integer,
            Value::Ref(id) => match self.get(id) {
                HeapData::Str { .. } => Kind::String,
                HeapData::Block { .. } => Kind::Block,
                HeapData::Instance { .. } => Kind::Instance,
            },
        }
    }

    /// The attribute map of a value. Integers have none: their value-copy
    /// semantics cannot retain attributes across copies.
    pub fn attrs(&self, value: Value) -> Option<&Attrs> {
        match value {
            Value::Nil => Some(&self.nil_attrs),
            Value::True => Some(&self.true_attrs),
            Value::False => Some(&self.false_attrs),
            Value::Int(_) => None,
            Value::Ref(id) => match self.get(id) {
                HeapData::Str { attrs, .. }
                | HeapData::Block { attrs, .. }
                | HeapData::Instance { attrs, .. } => Some(attrs),
            },
        }
    }

    pub fn attrs_mut(&mut self, value: Value) -> Option<&mut Attrs> {
        match value {
            Value::Nil => Some(&mut self.nil_attrs),
            Value::True => Some(&mut self.true_attrs),
            Value::False => Some(&mut self.false_attrs),
            Value::Int(_) => None,
            Value::Ref(id) => match &mut self.slots[id.index()] {
                HeapData::Str { attrs, .. }
                | HeapData::Block { attrs, .. }
                | HeapData::Instance { attrs, .. } => Some(attrs),
            },
        }
    }
}
