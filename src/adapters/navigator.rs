use crate::domain::model::Destination;
use crate::domain::ports::Navigator;
use std::sync::Mutex;

/// 記錄導向歷程；CLI 用它來顯示登入後該去哪個頁面
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Destination>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<Destination> {
        self.history.lock().ok()?.last().copied()
    }

    pub fn history(&self) -> Vec<Destination> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, destination: Destination) {
        tracing::info!("🧭 Redirecting to {}", destination.path());
        if let Ok(mut history) = self.history.lock() {
            history.push(destination);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let navigator = RecordingNavigator::new();
        assert_eq!(navigator.last(), None);

        navigator.navigate(Destination::TenantDashboard);
        navigator.navigate(Destination::Login);

        assert_eq!(navigator.last(), Some(Destination::Login));
        assert_eq!(
            navigator.history(),
            vec![Destination::TenantDashboard, Destination::Login]
        );
    }
}
