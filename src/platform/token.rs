use tokio::sync::RwLock;

/// Single cached bearer token. Concurrent callers may race to clear and
/// refill it; the worst case is a redundant login.
#[derive(Default)]
pub struct SessionToken {
    value: RwLock<Option<String>>,
}

impl SessionToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<String> {
        self.value.read().await.clone()
    }

    pub async fn set(&self, token: impl Into<String>) {
        *self.value.write().await = Some(token.into());
    }

    pub async fn clear(&self) {
        *self.value.write().await = None;
    }

    pub async fn is_present(&self) -> bool {
        self.value.read().await.is_some()
    }
}
