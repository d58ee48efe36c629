//! 去重存储
//!
//! 按帖子ID只写一次,保持首次插入顺序; 没有删除操作。

use crate::models::ProfilePost;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct DedupStore {
    posts: Vec<ProfilePost>,
    index: HashMap<String, usize>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入帖子,ID已存在时不做任何修改
    ///
    /// 返回是否为新帖子
    pub fn insert_if_absent(&mut self, post: ProfilePost) -> bool {
        if self.index.contains_key(&post.tweet_id) {
            return false;
        }

        self.index.insert(post.tweet_id.clone(), self.posts.len());
        self.posts.push(post);
        true
    }

    pub fn contains(&self, tweet_id: &str) -> bool {
        self.index.contains_key(tweet_id)
    }

    pub fn get(&self, tweet_id: &str) -> Option<&ProfilePost> {
        self.index.get(tweet_id).map(|&i| &self.posts[i])
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// 前 n 条,按插入顺序,不修改存储
    pub fn take(&self, n: usize) -> Vec<ProfilePost> {
        self.posts.iter().take(n).cloned().collect()
    }
}
