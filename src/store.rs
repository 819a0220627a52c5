//! In-memory review ledger backing the admin dashboard queries

use std::collections::BTreeMap;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;
use log::{debug, info};

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_PRIORITY_LIMIT: usize = 20;

/// Header of the CSV export
pub const EXPORT_HEADER: [&str; 7] = [
  "ID"
, "Rating"
, "Review Text"
, "Summary"
, "Recommended Actions"
, "User Response"
, "Created At"
];

/// A stored review with its generated outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord
{   pub id: Uuid
  , pub rating: u8
  , pub review_text: String
  , pub summary: String
  , pub recommended_actions: Vec<String>
  , pub user_response: String
  , pub created_at: DateTime<Utc>
}

impl ReviewRecord
{   /// Ratings 1 and 2 need attention first
    pub fn is_urgent(&self) -> bool
    {   matches!(self.rating, 1 | 2)
    }

    fn csv_fields(&self) -> [String; 7]
    {   [ self.id.to_string()
        , self.rating.to_string()
        , self.review_text.clone()
        , self.summary.clone()
        , self.recommended_actions.join(", ")
        , self.user_response.clone()
        , self.created_at.to_rfc3339()
        ]
    }
}

/// Paging and filtering for [`ReviewStore::list`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery
{   #[serde(default)]
    pub rating: Option<u8>
  , /// 1-based
    pub page: usize
  , pub page_size: usize
}

impl Default for ListQuery
{   fn default() -> Self
    {   ListQuery
        {   rating: None
          , page: 1
          , page_size: DEFAULT_PAGE_SIZE
        }
    }
}

impl ListQuery
{   fn validate(&self) -> Result<(), crate::error::Error>
    {   validate_rating_filter(self.rating)?;
        if self.page == 0
        {   return Err(crate::error::Error::Validation(
              "page must be at least 1".to_string()
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size)
        {   return Err(crate::error::Error::Validation(format!(
              "page_size must be 1-{}",
              MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }
}

/// One page of reviews, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewPage
{   pub reviews: Vec<ReviewRecord>
  , /// Matching reviews across all pages
    pub total: usize
  , pub page: usize
  , pub page_size: usize
}

/// Aggregate figures for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics
{   pub total_reviews: usize
  , /// Rounded to two decimals; 0 when empty
    pub average_rating: f64
  , /// Every rating 1..=5 is present
    pub rating_distribution: BTreeMap<u8, usize>
  , /// Created within the last 24 hours
    pub recent_reviews_count: usize
}

/// Urgent reviews, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityReviews
{   pub urgent_reviews: Vec<ReviewRecord>
  , pub total_urgent: usize
  , pub message: String
}

/// Review ledger shared by the intake and admin paths
#[derive(Debug, Default)]
pub struct ReviewStore
{   reviews: RwLock<Vec<ReviewRecord>>
}

impl ReviewStore
{   pub fn new() -> Self
    {   Self::default()
    }

    /// Validate, analyze and store a submission
    pub async fn submit(
      &self
    , analyzer: &crate::analysis::ReviewAnalyzer
    , submission: &crate::analysis::ReviewSubmission
    ) -> Result<ReviewRecord, crate::error::Error>
    {   let submission = submission.validate()?;
        let analysis = analyzer.process_review(&submission).await;
        self.create(&submission, analysis).await
    }

    /// Store a submission with its generated outputs
    pub async fn create(
      &self
    , submission: &crate::analysis::ReviewSubmission
    , analysis: crate::analysis::ReviewAnalysis
    ) -> Result<ReviewRecord, crate::error::Error>
    {   let submission = submission.validate()?;
        let record = ReviewRecord
        {   id: Uuid::new_v4()
          , rating: submission.rating
          , review_text: submission.review_text
          , summary: analysis.summary
          , recommended_actions: analysis.recommended_actions
          , user_response: analysis.user_response
          , created_at: Utc::now()
        };
        self.insert(record.clone()).await;
        info!("Review saved: id={}", record.id);
        Ok(record)
    }

    /// Store a fully built record as is
    pub async fn insert(&self, record: ReviewRecord)
    {   self.reviews.write().await.push(record);
    }

    pub async fn len(&self) -> usize
    {   self.reviews.read().await.len()
    }

    pub async fn is_empty(&self) -> bool
    {   self.reviews.read().await.is_empty()
    }

    pub async fn get(&self, id: Uuid) -> Option<ReviewRecord>
    {   self.reviews.read().await
          .iter()
          .find(|r| r.id == id)
          .cloned()
    }

    /// Matching reviews, newest first; ties keep the later insert first
    async fn newest_first<F>(&self, keep: F) -> Vec<ReviewRecord>
    where F: Fn(&ReviewRecord) -> bool
    {   let mut matching: Vec<ReviewRecord> = self.reviews.read().await
          .iter()
          .rev()
          .filter(|r| keep(*r))
          .cloned()
          .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching
    }

    pub async fn list(
      &self
    , query: &ListQuery
    ) -> Result<ReviewPage, crate::error::Error>
    {   query.validate()?;
        let matching = self.newest_first(|r| {
          query.rating.map_or(true, |rating| r.rating == rating)
        }).await;
        let total = matching.len();
        let reviews = matching.into_iter()
          .skip((query.page - 1).saturating_mul(query.page_size))
          .take(query.page_size)
          .collect();
        debug!("Listing page {} of {} reviews", query.page, total);
        Ok(ReviewPage
        {   reviews
          , total
          , page: query.page
          , page_size: query.page_size
        })
    }

    pub async fn analytics(&self, now: DateTime<Utc>) -> Analytics
    {   let reviews = self.reviews.read().await;
        let mut rating_distribution: BTreeMap<u8, usize>
          = (1..=5).map(|r| (r, 0)).collect();
        let since = now - Duration::hours(24);
        let mut sum = 0u64;
        let mut recent_reviews_count = 0;

        for review in reviews.iter()
        {   if let Some(count) = rating_distribution.get_mut(&review.rating)
            {   *count += 1;
            }
            sum += u64::from(review.rating);
            if review.created_at >= since
            {   recent_reviews_count += 1;
            }
        }

        let average_rating = if reviews.is_empty()
        {   0.0
        } else
        {   let avg = sum as f64 / reviews.len() as f64;
            (avg * 100.0).round() / 100.0
        };

        Analytics
        {   total_reviews: reviews.len()
          , average_rating
          , rating_distribution
          , recent_reviews_count
        }
    }

    /// Up to `limit` reviews rated 1 or 2
    pub async fn priority(
      &self
    , limit: usize
    ) -> Result<PriorityReviews, crate::error::Error>
    {   if !(1..=MAX_PAGE_SIZE).contains(&limit)
        {   return Err(crate::error::Error::Validation(format!(
              "limit must be 1-{}",
              MAX_PAGE_SIZE
            )));
        }
        let urgent = self.newest_first(ReviewRecord::is_urgent).await;
        let total_urgent = urgent.len();
        Ok(PriorityReviews
        {   urgent_reviews: urgent.into_iter().take(limit).collect()
          , total_urgent
          , message: format!(
              "Found {} reviews requiring immediate attention",
              total_urgent
            )
        })
    }

    /// All matching reviews as CSV, newest first
    pub async fn export_csv(
      &self
    , rating: Option<u8>
    ) -> Result<String, crate::error::Error>
    {   validate_rating_filter(rating)?;
        let reviews = self.newest_first(|r| {
          rating.map_or(true, |rating| r.rating == rating)
        }).await;

        let mut out = crate::csv::record(&EXPORT_HEADER);
        for review in &reviews
        {   out.push_str(&crate::csv::record(&review.csv_fields()));
        }
        debug!("Exported {} reviews", reviews.len());
        Ok(out)
    }
}

/// Download name for an export taken at `now`
pub fn export_filename(now: DateTime<Utc>) -> String
{   format!("reviews_export_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

fn validate_rating_filter(
  rating: Option<u8>
) -> Result<(), crate::error::Error>
{   match rating
    {   Some(r) if !(1..=5).contains(&r) => {
          Err(crate::error::Error::Validation(
            format!("rating filter {} outside 1-5", r)
          ))
        }
      , _ => Ok(())
    }
}
