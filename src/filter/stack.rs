//! Ordered, named filter stacks
//!
//! A stack only holds filter names. Names are resolved to implementations when
//! a pipeline is built, so a stack can reference filters that are registered
//! later (or substituted in tests).

use thiserror::Error;

/// Errors raised while editing a filter stack
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("No filter named '{anchor}' in the stack")]
    AnchorNotFound { anchor: String },

    #[error("A filter named '{name}' is already in the stack")]
    DuplicateName { name: String },
}

/// Ordered list of unique filter names; insertion order is execution order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStack {
    names: Vec<String>,
}

impl FilterStack {
    /// Creates an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a stack from names, keeping only the first occurrence of each
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut stack = Self::new();
        for name in names {
            let name = name.into();
            if !stack.contains(&name) {
                stack.names.push(name);
            }
        }
        stack
    }

    /// Appends filters to the end of the stack
    ///
    /// # Returns
    ///
    /// * `Ok(())` - All names were appended, in order
    /// * `Err(StackError::DuplicateName)` - A name is already present; the stack is unchanged
    pub fn push<I, S>(&mut self, names: I) -> Result<(), StackError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let new_names = self.checked_names(names)?;
        self.names.extend(new_names);
        Ok(())
    }

    /// Inserts filters immediately before `anchor`, keeping their relative order
    ///
    /// Fails without modifying the stack if `anchor` is absent or a name is a duplicate.
    pub fn insert_before<I, S>(&mut self, anchor: &str, names: I) -> Result<(), StackError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let index = self.position_of(anchor)?;
        let new_names = self.checked_names(names)?;
        self.names.splice(index..index, new_names);
        Ok(())
    }

    /// Inserts filters immediately after `anchor`, keeping their relative order
    ///
    /// Fails without modifying the stack if `anchor` is absent or a name is a duplicate.
    pub fn insert_after<I, S>(&mut self, anchor: &str, names: I) -> Result<(), StackError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let index = self.position_of(anchor)? + 1;
        let new_names = self.checked_names(names)?;
        self.names.splice(index..index, new_names);
        Ok(())
    }

    /// Removes a filter by name, returning whether it was present
    pub fn remove(&mut self, name: &str) -> bool {
        match self.names.iter().position(|n| n == name) {
            Some(index) => {
                self.names.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns a copy that can be extended without affecting this stack
    pub fn inheritable_copy(&self) -> Self {
        self.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Filter names in execution order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn position_of(&self, anchor: &str) -> Result<usize, StackError> {
        self.names
            .iter()
            .position(|n| n == anchor)
            .ok_or_else(|| StackError::AnchorNotFound {
                anchor: anchor.to_string(),
            })
    }

    /// Collects new names, rejecting any already in the stack or repeated in the batch
    fn checked_names<I, S>(&self, names: I) -> Result<Vec<String>, StackError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut checked: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if self.contains(&name) || checked.contains(&name) {
                return Err(StackError::DuplicateName { name });
            }
            checked.push(name);
        }
        Ok(checked)
    }
}
