//! Mint an access token for local use.
//!
//! ```text
//! biblio-token <USER_ID> <ROLE>
//! ```
//!
//! Reads `JWT_SECRET` and `JWT_ACCESS_EXPIRY_MINS` the same way the server
//! does and prints the token to stdout.

use std::process::ExitCode;

use clap::Parser;

use biblio_api::auth::jwt::{generate_access_token, JwtConfig};
use biblio_core::roles::{is_known_role, VALID_ROLES};
use biblio_core::types::DbId;

#[derive(Parser, Debug)]
#[command(name = "biblio-token", about = "Mint a catalog API access token")]
struct Args {
    /// Id placed in the token's `sub` claim.
    #[arg(value_name = "USER_ID", allow_hyphen_values = true)]
    user_id: DbId,
    /// Role claim; one of the roles the API accepts.
    #[arg(value_name = "ROLE", value_parser = parse_role)]
    role: String,
}

fn parse_role(raw: &str) -> Result<String, String> {
    if is_known_role(raw) {
        Ok(raw.to_string())
    } else {
        Err(format!(
            "unknown role `{raw}`, expected one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = JwtConfig::from_env();
    match generate_access_token(args.user_id, &args.role, &config) {
        Ok(token) => {
            println!("{token}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("failed to sign token: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_user_id_and_role() {
        let args = Args::try_parse_from(["biblio-token", "42", "admin"]).unwrap();
        assert_eq!(args.user_id, 42);
        assert_eq!(args.role, "admin");
    }

    #[test]
    fn rejects_unknown_role() {
        let err = Args::try_parse_from(["biblio-token", "42", "root"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn rejects_non_numeric_user_id() {
        assert!(Args::try_parse_from(["biblio-token", "alice", "user"]).is_err());
    }

    #[test]
    fn requires_both_arguments() {
        let err = Args::try_parse_from(["biblio-token", "42"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
