//! Class registry: descriptors, inheritance chain, and method lookup.
//!
//! The seven built-in classes occupy fixed ids with `Object` as the root;
//! user classes are appended during the XML pass. The registry is immutable
//! once parsing completes.

use ahash::AHashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ErrorKind, RunError, RunResult},
    expressions::BlockId,
};

/// Identifier of a class descriptor interned in [`ClassRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) struct ClassId(u32);

impl ClassId {
    pub const OBJECT: Self = Self(0);
    pub const NIL: Self = Self(1);
    pub const TRUE: Self = Self(2);
    pub const FALSE: Self = Self(3);
    pub const INTEGER: Self = Self(4);
    pub const STRING: Self = Self(5);
    pub const BLOCK: Self = Self(6);

    fn new(index: usize) -> Self {
        Self(index.try_into().expect("class table overflow"))
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A class descriptor: name, parent, and the selector → block method table.
///
/// The method table is insertion-ordered so errors and traces are
/// deterministic across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ClassDesc {
    name: String,
    parent: Option<ClassId>,
    methods: IndexMap<String, BlockId>,
}

/// All class descriptors plus the case-sensitive name lookup table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ClassRegistry {
    classes: Vec<ClassDesc>,
    by_name: AHashMap<String, ClassId>,
}

/// Checks the `[A-Z][A-Za-z0-9]*` class-name pattern.
pub(crate) fn is_valid_class_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|first| first.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

impl ClassRegistry {
    /// Creates a registry with the seven built-in classes pre-registered.
    pub fn new() -> Self {
        let mut registry = Self {
            classes: Vec::new(),
            by_name: AHashMap::new(),
        };
        registry.register("Object", None);
        for name in ["Nil", "True", "False", "Integer", "String", "Block"] {
            registry.register(name, Some(ClassId::OBJECT));
        }
        registry
    }

    fn register(&mut self, name: &str, parent: Option<ClassId>) -> ClassId {
        let id = ClassId::new(self.classes.len());
        self.classes.push(ClassDesc {
            name: name.to_owned(),
            parent,
            methods: IndexMap::new(),
        });
        self.by_name.insert(name.to_owned(), id);
        id
    }

    /// Registers a user class. The parent must already be registered, so a
    /// class can only extend a built-in or a class declared earlier in the
    /// document, and inheritance cycles cannot form.
    pub fn add_class(&mut self, name: &str, parent_name: &str) -> RunResult<ClassId> {
        if !is_valid_class_name(name) {
            return Err(RunError::type_err(format!("invalid class name '{name}'")));
        }
        if self.exists(name) {
            return Err(RunError::type_err(format!("class '{name}' is already defined")));
        }
        let Some(parent) = self.get(parent_name) else {
            return Err(RunError::undefined(parent_name));
        };
        Ok(self.register(name, Some(parent)))
    }

    /// Adds a method to a class; duplicate selectors within one class fail.
    pub fn add_method(&mut self, class: ClassId, selector: &str, block: BlockId) -> RunResult<()> {
        let desc = &mut self.classes[class.index()];
        if desc.methods.contains_key(selector) {
            return Err(RunError::type_err(format!(
                "class '{}' defines '{selector}' more than once",
                desc.name
            )));
        }
        desc.methods.insert(selector.to_owned(), block);
        Ok(())
    }

    /// Looks up a class by name. Case-sensitive.
    pub fn get(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn name(&self, class: ClassId) -> &str {
        &self.classes[class.index()].name
    }

    pub fn parent(&self, class: ClassId) -> Option<ClassId> {
        self.classes[class.index()].parent
    }

    /// Resolves a selector on the class itself, then along its ancestors.
    pub fn find_method(&self, class: ClassId, selector: &str) -> Option<BlockId> {
        let mut current = Some(class);
        while let Some(id) = current {
            let desc = &self.classes[id.index()];
            if let Some(block) = desc.methods.get(selector) {
                return Some(*block);
            }
            current = desc.parent;
        }
        None
    }

    /// Resolves a selector starting at the parent, skipping the class itself.
    /// This is the `super` lookup.
    pub fn find_method_in_parent(&self, class: ClassId, selector: &str) -> Option<BlockId> {
        self.parent(class)
            .and_then(|parent| self.find_method(parent, selector))
    }

    /// True when `ancestor` is `class` itself or appears in its parent chain.
    pub fn is_same_or_ancestor(&self, ancestor: ClassId, class: ClassId) -> bool {
        let mut current = Some(class);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// The `from:` compatibility rule: the classes are the same or one is an
    /// ancestor of the other.
    pub fn are_related(&self, a: ClassId, b: ClassId) -> bool {
        self.is_same_or_ancestor(a, b) || self.is_same_or_ancestor(b, a)
    }

    /// Validates the `Main`/`run` entry point; called once after parsing.
    pub fn require_main(&self, arity_of: impl Fn(BlockId) -> usize) -> RunResult<ClassId> {
        let missing = || {
            RunError::new(
                ErrorKind::MissingMain,
                "class Main with a parameterless method 'run' is required",
            )
        };
        let main = self.get("Main").ok_or_else(missing)?;
        match self.find_method(main, "run") {
            Some(block) if arity_of(block) == 0 => Ok(main),
            _ => Err(missing()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_classes_have_object_as_root() {
        let registry = ClassRegistry::new();
        assert_eq!(registry.get("Object"), Some(ClassId::OBJECT));
        assert_eq!(registry.parent(ClassId::OBJECT), None);
        for name in ["Nil", "True", "False", "Integer", "String", "Block"] {
            let id = registry.get(name).expect("built-in registered");
            assert_eq!(registry.parent(id), Some(ClassId::OBJECT));
        }
    }

    #[test]
    fn class_name_pattern() {
        assert!(is_valid_class_name("Main"));
        assert!(is_valid_class_name("A1b2"));
        assert!(!is_valid_class_name(""));
        assert!(!is_valid_class_name("main"));
        assert!(!is_valid_class_name("My_Class"));
        assert!(!is_valid_class_name("1Main"));
    }

    #[test]
    fn redefining_a_builtin_fails() {
        let mut registry = ClassRegistry::new();
        let err = registry.add_class("Integer", "Object").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }

    #[test]
    fn unknown_parent_fails() {
        let mut registry = ClassRegistry::new();
        let err = registry.add_class("Foo", "Bar").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedName);
    }

    #[test]
    fn ancestry_walks() {
        let mut registry = ClassRegistry::new();
        let a = registry.add_class("A", "Integer").unwrap();
        let b = registry.add_class("B", "A").unwrap();
        assert!(registry.is_same_or_ancestor(ClassId::INTEGER, b));
        assert!(registry.is_same_or_ancestor(a, b));
        assert!(!registry.is_same_or_ancestor(b, a));
        assert!(registry.are_related(b, ClassId::OBJECT));
        assert!(!registry.are_related(b, ClassId::STRING));
    }
}
