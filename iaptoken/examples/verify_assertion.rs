//! Verifies an assertion taken from an `x-goog-iap-jwt-assertion` header.
//!
//! ```text
//! cargo run --example verify_assertion -- <assertion> <audience>
//! ```
use std::{
    env,
    error::Error,
    process::ExitCode,
    sync::Arc,
    time::Duration,
};

use iaptoken::{
    KeySetProvider,
    Validator,
    transport::ReqwestClient,
};

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let (Some(assertion), Some(audience)) = (args.next(), args.next()) else {
        eprintln!("usage: verify_assertion <assertion> <audience>");
        return Ok(ExitCode::FAILURE);
    };

    let client = ReqwestClient::new(Duration::from_secs(5))?;
    let keys = Arc::new(KeySetProvider::new(client));
    let validator = Validator::builder(keys, audience)
        .with_allowed_drift(Duration::from_secs(30))
        .with_max_size(8 * 1024)
        .build();

    match validator.validate(&assertion) {
        Ok(claims) => {
            println!("{}", serde_json::to_string_pretty(&claims)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("rejected: {err}");
            if err.kind().is_key_set_error() {
                eprintln!("the key endpoint may be unavailable; retrying later can help");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
