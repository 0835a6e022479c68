use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub query: String,
    pub answer: String,
}

#[derive(Default)]
pub struct ConversationLog {
    turns: Mutex<Vec<Turn>>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, query: impl Into<String>, answer: impl Into<String>) {
        self.turns.lock().push(Turn {
            query: query.into(),
            answer: answer.into(),
        });
    }

    pub fn last(&self) -> Option<Turn> {
        self.turns.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.turns.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_returns_most_recent_turn() {
        let log = ConversationLog::new();
        assert!(log.last().is_none());
        log.record("a", "1");
        log.record("b", "2");
        assert_eq!(
            log.last(),
            Some(Turn {
                query: "b".to_string(),
                answer: "2".to_string(),
            })
        );
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn concurrent_appends_are_all_kept() {
        let log = std::sync::Arc::new(ConversationLog::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let log = log.clone();
            handles.push(std::thread::spawn(move || {
                log.record(format!("q{i}"), format!("a{i}"));
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(log.len(), 8);
    }
}
