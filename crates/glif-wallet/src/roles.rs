//! Account names used by a pool agent.

use std::fmt;
use std::str::FromStr;

use crate::WalletError;

/// Well-known agent accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    /// Owns the agent contract
    Owner,
    /// Signs day-to-day agent operations
    Operator,
    /// Signs credential requests
    Request,
}

impl AgentRole {
    pub const ALL: [AgentRole; 3] = [AgentRole::Owner, AgentRole::Operator, AgentRole::Request];

    /// Keystore account name for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Owner => "owner",
            AgentRole::Operator => "operator",
            AgentRole::Request => "request",
        }
    }

    /// Role whose account name is `name`, if any.
    pub fn from_account_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == name)
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRole {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_account_name(s)
            .ok_or_else(|| WalletError::InvalidName(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names() {
        assert_eq!(AgentRole::Owner.as_str(), "owner");
        assert_eq!("operator".parse::<AgentRole>().unwrap(), AgentRole::Operator);
        assert_eq!(AgentRole::from_account_name("request"), Some(AgentRole::Request));
        assert!(AgentRole::from_account_name("treasury").is_none());
    }

    #[test]
    fn test_parse_matches_account_names_exactly() {
        for role in AgentRole::ALL {
            assert_eq!(role.as_str().parse::<AgentRole>().unwrap(), role);
        }
        assert!(matches!("Owner".parse::<AgentRole>(), Err(WalletError::InvalidName(_))));
        assert!(AgentRole::from_account_name("Owner").is_none());
    }
}
