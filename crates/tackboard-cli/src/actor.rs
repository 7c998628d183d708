//! Actor identity resolution for CLI commands.
//!
//! The resolution chain: `--actor` flag > `TACK_ACTOR` env > user config
//! `actor` > `USER` env (TTY only). Commands that move, create or delete
//! tasks require an actor; read-only commands work without one.

use std::env;
use tackboard_core::model::Actor;

/// Errors from actor resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorResolutionError {
    /// Human-readable description.
    pub message: String,
    /// Machine error code.
    pub code: &'static str,
}

impl std::fmt::Display for ActorResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ActorResolutionError {}

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
    fn is_tty(&self) -> bool;
}

/// Real environment reader.
struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    fn is_tty(&self) -> bool {
        use std::io::IsTerminal;
        std::io::stdin().is_terminal()
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Core resolution logic, parameterized by environment reader.
fn resolve_actor_with(
    cli_flag: Option<&str>,
    config_actor: Option<&str>,
    env: &dyn EnvReader,
) -> Option<String> {
    if let Some(actor) = non_empty(cli_flag) {
        return Some(actor);
    }

    if let Some(val) = env.get("TACK_ACTOR") {
        return Some(val);
    }

    if let Some(actor) = non_empty(config_actor) {
        return Some(actor);
    }

    // USER only counts for an interactive operator.
    if env.is_tty() {
        return env.get("USER");
    }

    None
}

/// Resolve the actor identity, returning `None` if nothing matched.
pub fn resolve_actor(cli_flag: Option<&str>, config_actor: Option<&str>) -> Option<String> {
    resolve_actor_with(cli_flag, config_actor, &RealEnv)
}

/// Resolve the actor identity, returning an error if not found.
///
/// Use this for commands that record who acted.
pub fn require_actor(
    cli_flag: Option<&str>,
    config_actor: Option<&str>,
) -> Result<Actor, ActorResolutionError> {
    resolve_actor(cli_flag, config_actor)
        .map(Actor::new)
        .ok_or_else(|| ActorResolutionError {
            message: "Actor identity required for this command. \
                      Set --actor, TACK_ACTOR, or `actor` in the user config."
                .to_string(),
            code: "missing_actor",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Test environment reader with configurable values.
    struct MockEnv {
        vars: HashMap<String, String>,
        tty: bool,
    }

    impl MockEnv {
        fn new() -> Self {
            Self {
                vars: HashMap::new(),
                tty: false,
            }
        }

        fn var(mut self, key: &str, val: &str) -> Self {
            self.vars.insert(key.to_string(), val.to_string());
            self
        }

        const fn tty(mut self) -> Self {
            self.tty = true;
            self
        }
    }

    impl EnvReader for MockEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.vars.get(key).filter(|v| !v.is_empty()).cloned()
        }

        fn is_tty(&self) -> bool {
            self.tty
        }
    }

    #[test]
    fn cli_flag_takes_priority() {
        let env = MockEnv::new().var("TACK_ACTOR", "env-actor");
        let result = resolve_actor_with(Some("flag-actor"), Some("config-actor"), &env);
        assert_eq!(result.as_deref(), Some("flag-actor"));
    }

    #[test]
    fn env_beats_user_config() {
        let env = MockEnv::new().var("TACK_ACTOR", "env-actor");
        let result = resolve_actor_with(None, Some("config-actor"), &env);
        assert_eq!(result.as_deref(), Some("env-actor"));
    }

    #[test]
    fn user_config_beats_user_env() {
        let env = MockEnv::new().var("USER", "maria").tty();
        let result = resolve_actor_with(None, Some("front-desk"), &env);
        assert_eq!(result.as_deref(), Some("front-desk"));
    }

    #[test]
    fn blank_flag_and_config_ignored() {
        let env = MockEnv::new().var("TACK_ACTOR", "env-actor");
        assert_eq!(
            resolve_actor_with(Some("  "), None, &env).as_deref(),
            Some("env-actor")
        );
        let env = MockEnv::new();
        assert_eq!(resolve_actor_with(None, Some(""), &env), None);
    }

    #[test]
    fn user_env_only_in_tty() {
        let env = MockEnv::new().var("USER", "bob");
        assert_eq!(resolve_actor_with(None, None, &env), None);

        let env = MockEnv::new().var("USER", "bob").tty();
        assert_eq!(resolve_actor_with(None, None, &env).as_deref(), Some("bob"));
    }

    #[test]
    fn require_actor_succeeds_with_flag() {
        let actor = require_actor(Some("ops-bot"), None).expect("flag resolves");
        assert_eq!(actor.as_str(), "ops-bot");
    }

    #[test]
    fn resolution_error_displays_message() {
        let err = ActorResolutionError {
            message: "need an actor".to_string(),
            code: "missing_actor",
        };
        assert_eq!(err.to_string(), "need an actor");
        let _: Box<dyn std::error::Error> = Box::new(err);
    }
}
