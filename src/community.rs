use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{MirrorError, Result};
use crate::models::Classification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Yes,
    No,
    Maybe,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub yes: u32,
    pub no: u32,
    pub maybe: u32,
}

impl VoteTally {
    pub fn total(&self) -> u32 {
        self.yes + self.no + self.maybe
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub user: String,
    pub avatar: String,
    pub question: String,
    pub item: String,
    pub price: f64,
    pub votes: VoteTally,
    pub comments: u32,
    pub time_ago: String,
}

/// The community "should I buy this?" feed. Owns its posts; callers hold it
/// explicitly instead of sharing a global list.
#[derive(Debug, Default)]
pub struct CommunityFeed {
    posts: Vec<Post>,
    next_id: u64,
}

impl CommunityFeed {
    pub fn new() -> Self {
        Self {
            posts: Vec::new(),
            next_id: 1,
        }
    }

    /// A feed pre-populated with the demo posts.
    pub fn with_sample_posts() -> Self {
        let mut feed = Self::new();
        let samples = [
            ("Sarah M.", "👩", "Should I buy these?", "New Running Shoes", 180.0, (12, 3, 5), 8, "2h ago"),
            ("Alex K.", "🧑", "Honest opinions needed!", "Gaming Console", 499.0, (8, 15, 12), 23, "5h ago"),
            ("Jamie L.", "👨", "Is this worth it?", "Meditation App Subscription", 12.0, (24, 2, 1), 15, "1d ago"),
        ];
        for (user, avatar, question, item, price, (yes, no, maybe), comments, time_ago) in samples {
            let id = feed.allocate_id();
            feed.posts.push(Post {
                id,
                user: user.to_string(),
                avatar: avatar.to_string(),
                question: question.to_string(),
                item: item.to_string(),
                price,
                votes: VoteTally { yes, no, maybe },
                comments,
                time_ago: time_ago.to_string(),
            });
        }
        feed
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    fn find_mut(&mut self, id: u64) -> Result<&mut Post> {
        self.posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| MirrorError::NotFound(format!("post {}", id)))
    }

    // Queries

    /// Newest first.
    pub fn posts(&self) -> Vec<Post> {
        let mut out = self.posts.clone();
        out.sort_by(|a, b| b.id.cmp(&a.id));
        out
    }

    pub fn get(&self, id: u64) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    // Commands

    pub fn create_post(&mut self, user: &str, question: &str, item: &str, price: f64) -> Post {
        let id = self.allocate_id();
        let post = Post {
            id,
            user: user.to_string(),
            avatar: "🙂".to_string(),
            question: question.to_string(),
            item: item.to_string(),
            price,
            votes: VoteTally::default(),
            comments: 0,
            time_ago: "just now".to_string(),
        };
        debug!("Community post {} created by {}", id, user);
        self.posts.push(post.clone());
        post
    }

    /// Publishes a classification result as a poll.
    pub fn share_classification(
        &mut self,
        user: &str,
        item: &str,
        price: f64,
        result: &Classification,
    ) -> Post {
        let question = format!(
            "My purchase check says this is {} (score {:.0}). Should I still buy it?",
            result.decision, result.score
        );
        self.create_post(user, &question, item, price)
    }

    pub fn vote(&mut self, id: u64, vote: Vote) -> Result<Post> {
        let post = self.find_mut(id)?;
        match vote {
            Vote::Yes => post.votes.yes += 1,
            Vote::No => post.votes.no += 1,
            Vote::Maybe => post.votes.maybe += 1,
        }
        Ok(post.clone())
    }

    pub fn comment(&mut self, id: u64) -> Result<Post> {
        let post = self.find_mut(id)?;
        post.comments += 1;
        Ok(post.clone())
    }
}
