//! A single managed account: roles plus family links.

use kestrel_chain::role::RoleSet;
use kestrel_chain::transparent::Address;

/// One entry of the account registry.
///
/// The parent back reference is an address, never a pointer into the
/// registry, so reference cycles are impossible by construction: walking
/// up the tree always goes through a registry lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    roles: RoleSet,
    parent: Option<Address>,
    children: Vec<Address>,
}

impl Account {
    /// A parentless account. Adding it to the registry makes it the
    /// root.
    pub fn new(roles: RoleSet) -> Account {
        Account {
            roles,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_parent(roles: RoleSet, parent: Address) -> Account {
        Account {
            roles,
            parent: Some(parent),
            children: Vec::new(),
        }
    }

    pub fn roles(&self) -> RoleSet {
        self.roles
    }

    pub fn set_roles(&mut self, roles: RoleSet) {
        self.roles = roles;
    }

    pub fn parent(&self) -> Option<&Address> {
        self.parent.as_ref()
    }

    pub fn set_parent(&mut self, parent: Option<Address>) {
        self.parent = parent;
    }

    pub fn children(&self) -> &[Address] {
        &self.children
    }

    /// Append a child, keeping the list unique and in insertion order.
    /// Returns whether the child was newly added.
    pub fn add_child(&mut self, child: Address) -> bool {
        if self.children.contains(&child) {
            return false;
        }
        self.children.push(child);
        true
    }

    /// Remove a child. Returns whether it was present.
    pub fn remove_child(&mut self, child: &Address) -> bool {
        let before = self.children.len();
        self.children.retain(|existing| existing != child);
        self.children.len() != before
    }

    /// The registry file line for this account:
    /// `<roles>|<parent-or-empty>|<child>,<child>,...`
    pub(crate) fn encode_line(&self) -> String {
        let parent = match &self.parent {
            Some(parent) => parent.to_string(),
            None => String::new(),
        };
        let children: Vec<String> = self.children.iter().map(Address::to_string).collect();
        format!("{}|{}|{}", self.roles, parent, children.join(","))
    }

    /// Parse a registry file line.
    pub(crate) fn parse_line(line: &str) -> Result<Account, &'static str> {
        let mut fields = line.split('|');
        let roles = fields
            .next()
            .ok_or("account line is missing the role field")?
            .trim();
        let parent = fields
            .next()
            .ok_or("account line is missing the parent field")?
            .trim();
        let children = fields
            .next()
            .ok_or("account line is missing the children field")?
            .trim();
        if fields.next().is_some() {
            return Err("account line has trailing fields");
        }

        let roles: RoleSet = roles.parse().map_err(|_| "unparseable role string")?;
        let parent = if parent.is_empty() {
            None
        } else {
            Some(parent.parse().map_err(|_| "unparseable parent address")?)
        };

        let mut account = Account {
            roles,
            parent,
            children: Vec::new(),
        };
        for child in children.split(',').filter(|child| !child.is_empty()) {
            let child = child.parse().map_err(|_| "unparseable child address")?;
            account.add_child(child);
        }
        Ok(account)
    }
}
