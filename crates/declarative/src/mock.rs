//! In-memory adapters for testing without touching the host
//!
//! ```
//! use declarative::mock::MockAdapter;
//! use declarative::{Adapter, Category};
//!
//! let brew = MockAdapter::new("brew").with_installed(Category::Formulae, &["git"]);
//! brew.install(Category::Formulae, "jq").unwrap();
//!
//! let installed = brew.list_installed(Category::Formulae).unwrap();
//! assert!(installed.contains("jq"));
//! ```

use crate::adapter::{Adapter, IdentityStore, InstallError, Installed};
use crate::document::{GitIdentity, IdentityField};
use crate::types::Category;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Mock adapter keeping installed identifiers in memory
///
/// Successful installs add the identifier to the installed set, so a
/// second reconciliation sees it as present.
#[derive(Debug, Default)]
pub struct MockAdapter {
    name: String,
    installed: RefCell<BTreeMap<Category, BTreeMap<String, String>>>,
    failing: HashSet<String>,
    manual: HashSet<String>,
    batched: HashSet<Category>,
    list_error: Option<InstallError>,
    ensure_error: Option<InstallError>,
    unauthenticated: bool,
    install_calls: RefCell<Vec<(Category, Vec<String>)>>,
    ensure_calls: Cell<usize>,
}

impl MockAdapter {
    /// Create a new empty mock adapter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Mark identifiers as installed
    pub fn with_installed(self, category: Category, ids: &[&str]) -> Self {
        {
            let mut installed = self.installed.borrow_mut();
            let entry = installed.entry(category).or_default();
            for id in ids {
                entry.insert((*id).to_string(), (*id).to_string());
            }
        }
        self
    }

    /// Mark identifiers as installed with a display label
    pub fn with_labeled(self, category: Category, items: &[(&str, &str)]) -> Self {
        {
            let mut installed = self.installed.borrow_mut();
            let entry = installed.entry(category).or_default();
            for (id, label) in items {
                entry.insert((*id).to_string(), (*label).to_string());
            }
        }
        self
    }

    /// Make installs of an identifier fail
    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    /// Report an identifier as needing a manual install
    pub fn manual(mut self, id: &str) -> Self {
        self.manual.insert(id.to_string());
        self
    }

    /// Install a category's identifiers in a single batch call
    pub fn batched(mut self, category: Category) -> Self {
        self.batched.insert(category);
        self
    }

    /// Make listing fail with the given error
    pub fn with_list_error(mut self, error: InstallError) -> Self {
        self.list_error = Some(error);
        self
    }

    /// Make `ensure_available` fail with the given error
    pub fn with_ensure_error(mut self, error: InstallError) -> Self {
        self.ensure_error = Some(error);
        self
    }

    /// Behave like a store without a signed-in session
    pub fn unauthenticated(mut self) -> Self {
        self.unauthenticated = true;
        self
    }

    /// Every install call made so far, batches as one entry
    pub fn install_calls(&self) -> Vec<(Category, Vec<String>)> {
        self.install_calls.borrow().clone()
    }

    /// Number of `ensure_available` calls
    pub fn ensure_calls(&self) -> usize {
        self.ensure_calls.get()
    }

    fn auth_error(&self) -> InstallError {
        InstallError::Unauthenticated {
            backend: self.name.clone(),
        }
    }

    fn install_one(&self, category: Category, id: &str) -> Result<Installed, InstallError> {
        if self.manual.contains(id) {
            return Ok(Installed::ManualRequired {
                reason: format!("no installer for {id}"),
            });
        }
        if self.failing.contains(id) {
            return Err(InstallError::failed(format!("mock failure for {id}")));
        }
        self.installed
            .borrow_mut()
            .entry(category)
            .or_default()
            .insert(id.to_string(), id.to_string());
        Ok(Installed::Done)
    }
}

impl Adapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_installed(&self, category: Category) -> Result<BTreeSet<String>, InstallError> {
        Ok(self
            .list_labeled(category)?
            .into_iter()
            .map(|(id, _)| id)
            .collect())
    }

    fn list_labeled(&self, category: Category) -> Result<Vec<(String, String)>, InstallError> {
        if self.unauthenticated {
            return Err(self.auth_error());
        }
        if let Some(err) = &self.list_error {
            return Err(err.clone());
        }
        Ok(self
            .installed
            .borrow()
            .get(&category)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn ensure_available(&self, _category: Category) -> Result<(), InstallError> {
        self.ensure_calls.set(self.ensure_calls.get() + 1);
        match &self.ensure_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn install(&self, category: Category, identifier: &str) -> Result<Installed, InstallError> {
        self.install_calls
            .borrow_mut()
            .push((category, vec![identifier.to_string()]));
        if self.unauthenticated {
            return Err(self.auth_error());
        }
        self.install_one(category, identifier)
    }

    fn supports_batch(&self, category: Category) -> bool {
        self.batched.contains(&category)
    }

    fn install_batch(&self, category: Category, identifiers: &[&str]) -> Result<(), InstallError> {
        self.install_calls.borrow_mut().push((
            category,
            identifiers.iter().map(|s| (*s).to_string()).collect(),
        ));
        let mut failed = Vec::new();
        for id in identifiers {
            if self.install_one(category, id).is_err() {
                failed.push(*id);
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(InstallError::failed(format!(
                "batch failed for {}",
                failed.join(", ")
            )))
        }
    }
}

/// Mock git identity store
#[derive(Debug, Default)]
pub struct MockIdentity {
    values: RefCell<GitIdentity>,
    fail: bool,
    set_calls: RefCell<Vec<(IdentityField, String)>>,
}

impl MockIdentity {
    /// Create a store with preset values
    pub fn with_values(name: Option<&str>, email: Option<&str>) -> Self {
        Self {
            values: RefCell::new(GitIdentity {
                name: name.map(str::to_string),
                email: email.map(str::to_string),
            }),
            ..Self::default()
        }
    }

    /// Make every write fail
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Every write made so far
    pub fn set_calls(&self) -> Vec<(IdentityField, String)> {
        self.set_calls.borrow().clone()
    }
}

impl IdentityStore for MockIdentity {
    fn get(&self, field: IdentityField) -> Result<Option<String>, InstallError> {
        Ok(self.values.borrow().get(field).map(str::to_string))
    }

    fn set(&self, field: IdentityField, value: &str) -> Result<(), InstallError> {
        self.set_calls.borrow_mut().push((field, value.to_string()));
        if self.fail {
            return Err(InstallError::failed("git config is read-only"));
        }
        self.values
            .borrow_mut()
            .set(field, Some(value.to_string()));
        Ok(())
    }
}
