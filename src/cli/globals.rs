use secrecy::SecretString;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub upload_private_key: SecretString,
    pub upload_token_ttl: u64,
    pub session_ttl: i64,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(upload_private_key: SecretString) -> Self {
        Self {
            upload_private_key,
            upload_token_ttl: 600,
            session_ttl: 43200,
        }
    }
}
