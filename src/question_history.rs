use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Recently served question texts, keyed by normalized topic.
///
/// Lives for the lifetime of the process and is local to one instance; it only
/// makes repeats less likely. Cloning shares the same store.
#[derive(Debug, Clone)]
pub struct QuestionHistory {
    topics: Arc<RwLock<HashMap<String, TopicHistory>>>,
    per_topic_cap: usize,
    max_topics: usize,
}

#[derive(Debug, Clone)]
struct TopicHistory {
    questions: VecDeque<String>,
    last_touched: DateTime<Utc>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct HistoryStats {
    pub tracked_topics: usize,
    pub total_questions: usize,
    pub per_topic_cap: usize,
    pub max_topics: usize,
}

impl QuestionHistory {
    pub fn new(per_topic_cap: usize, max_topics: usize) -> Self {
        Self {
            topics: Arc::new(RwLock::new(HashMap::new())),
            per_topic_cap: per_topic_cap.max(1),
            max_topics: max_topics.max(1),
        }
    }

    /// Append a question for `topic`, evicting the oldest entry once the
    /// per-topic cap is reached.
    pub async fn record(&self, topic: &str, question: &str) {
        let mut topics = self.topics.write().await;

        if !topics.contains_key(topic) && topics.len() >= self.max_topics {
            Self::evict_least_recent(&mut topics);
        }

        let entry = topics.entry(topic.to_string()).or_insert_with(|| TopicHistory {
            questions: VecDeque::with_capacity(self.per_topic_cap),
            last_touched: Utc::now(),
        });

        while entry.questions.len() >= self.per_topic_cap {
            entry.questions.pop_front();
        }
        entry.questions.push_back(question.to_string());
        entry.last_touched = Utc::now();

        debug!(
            topic = %topic,
            retained = entry.questions.len(),
            "Recorded question in history"
        );
    }

    /// Up to `limit` of the most recent questions for `topic`, most recent last.
    pub async fn recent(&self, topic: &str, limit: usize) -> Vec<String> {
        let topics = self.topics.read().await;
        match topics.get(topic) {
            Some(entry) => {
                let skip = entry.questions.len().saturating_sub(limit);
                entry.questions.iter().skip(skip).cloned().collect()
            }
            None => Vec::new(),
        }
    }

    pub async fn len_for(&self, topic: &str) -> usize {
        let topics = self.topics.read().await;
        topics.get(topic).map_or(0, |entry| entry.questions.len())
    }

    pub async fn stats(&self) -> HistoryStats {
        let topics = self.topics.read().await;
        HistoryStats {
            tracked_topics: topics.len(),
            total_questions: topics.values().map(|entry| entry.questions.len()).sum(),
            per_topic_cap: self.per_topic_cap,
            max_topics: self.max_topics,
        }
    }

    pub async fn clear(&self) {
        self.topics.write().await.clear();
        debug!("Question history cleared");
    }

    pub fn per_topic_cap(&self) -> usize {
        self.per_topic_cap
    }

    fn evict_least_recent(topics: &mut HashMap<String, TopicHistory>) {
        if let Some(oldest) = topics
            .iter()
            .min_by_key(|(_, entry)| entry.last_touched)
            .map(|(topic, _)| topic.clone())
        {
            topics.remove(&oldest);
            debug!(topic = %oldest, "Evicted least recently used topic from history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recent_returns_most_recent_last() {
        let history = QuestionHistory::new(10, 8);
        history.record("Astronomy", "first?").await;
        history.record("Astronomy", "second?").await;
        history.record("Astronomy", "third?").await;

        assert_eq!(history.recent("Astronomy", 2).await, vec!["second?", "third?"]);
        assert_eq!(history.recent("Astronomy", 10).await.len(), 3);
        assert!(history.recent("Biology", 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_cap_evicts_oldest_first() {
        let history = QuestionHistory::new(10, 8);
        for i in 0..25 {
            history.record("Astronomy", &format!("question {}", i)).await;
            assert!(history.len_for("Astronomy").await <= 10);
        }

        let retained = history.recent("Astronomy", usize::MAX).await;
        let expected: Vec<String> = (15..25).map(|i| format!("question {}", i)).collect();
        assert_eq!(retained, expected);
    }

    #[tokio::test]
    async fn test_topics_are_independent() {
        let history = QuestionHistory::new(2, 8);
        history.record("Astronomy", "a1").await;
        history.record("Biology", "b1").await;
        history.record("Astronomy", "a2").await;
        history.record("Astronomy", "a3").await;

        assert_eq!(history.recent("Astronomy", 5).await, vec!["a2", "a3"]);
        assert_eq!(history.recent("Biology", 5).await, vec!["b1"]);
    }

    #[tokio::test]
    async fn test_topic_count_is_bounded() {
        let history = QuestionHistory::new(5, 2);
        history.record("Astronomy", "a").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        history.record("Biology", "b").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        history.record("Chemistry", "c").await;

        let stats = history.stats().await;
        assert_eq!(stats.tracked_topics, 2);
        assert_eq!(history.len_for("Astronomy").await, 0);
        assert_eq!(history.len_for("Chemistry").await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_state_and_clear_empties() {
        let history = QuestionHistory::new(5, 5);
        let shared = history.clone();
        shared.record("Astronomy", "a").await;
        assert_eq!(history.len_for("Astronomy").await, 1);

        history.clear().await;
        assert_eq!(shared.stats().await.total_questions, 0);
    }

    #[test]
    fn test_zero_cap_is_raised_to_one() {
        let history = QuestionHistory::new(0, 0);
        assert_eq!(history.per_topic_cap(), 1);
    }
}
