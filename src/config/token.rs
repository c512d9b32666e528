//! Deployment token parsing.
//!
//! A token has the shape `{kind}:{host}:{app_id}:{user_id}:{port}[:{bind_host}]`,
//! e.g. `nongh:0.0.0.0:1814173:5001:9001:0.0.0.0`. Only the kind, the user id
//! and the listen port are checked; the remaining parts are carried as-is.

use std::fmt;
use std::str::FromStr;

use crate::error::{DemoError, DemoResult};

/// Reference layout shown in token errors.
pub const TOKEN_FORMAT: &str = "nongh:0.0.0.0:1814173:5001:9001:0.0.0.0";

/// Where the demo is deployed relative to the relay front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentTarget {
    /// `gh` tokens: demo runs next to the front-end.
    Local,
    /// `nongh` tokens: demo runs on separate infrastructure.
    Remote,
}

impl fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentTarget::Local => write!(f, "local"),
            DeploymentTarget::Remote => write!(f, "remote"),
        }
    }
}

/// A validated deployment token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentToken {
    pub target: DeploymentTarget,
    pub host: String,
    pub app_id: String,
    pub user_id: u64,
    pub port: u16,
    pub bind_host: Option<String>,
}

impl DeploymentToken {
    /// Parse and validate a token string.
    pub fn parse(token: &str) -> DemoResult<Self> {
        let invalid = || {
            DemoError::InvalidToken(format!("TOKEN invalid: Required format {}", TOKEN_FORMAT))
        };

        let parts: Vec<&str> = token.trim().split(':').collect();
        if parts.len() < 5 {
            return Err(invalid());
        }

        let target = match parts[0] {
            "gh" => DeploymentTarget::Local,
            "nongh" => DeploymentTarget::Remote,
            _ => return Err(invalid()),
        };

        let user_id: u64 = parts[3].parse().map_err(|_| invalid())?;
        let port: u16 = parts[4].parse().map_err(|_| invalid())?;
        if user_id == 0 || port == 0 {
            return Err(invalid());
        }

        let bind_host = parts
            .get(5)
            .filter(|h| !h.is_empty())
            .map(|h| h.to_string());

        Ok(Self {
            target,
            host: parts[1].to_string(),
            app_id: parts[2].to_string(),
            user_id,
            port,
            bind_host,
        })
    }

    /// Socket address the demo server should listen on.
    pub fn bind_address(&self) -> String {
        let host = self.bind_host.as_deref().unwrap_or("0.0.0.0");
        format!("{}:{}", host, self.port)
    }
}

impl FromStr for DeploymentToken {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
