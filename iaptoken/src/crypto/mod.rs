/// [`aws-lc-rs`](aws_lc_rs) backed ES256 verification
pub mod aws_lc;
