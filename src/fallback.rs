//! Deterministic substitutes for free-text fields when the model
//! gives nothing usable

/// Summary budget in characters before truncation
pub const SUMMARY_CHAR_BUDGET: usize = 100;

/// Appended to a truncated summary
pub const ELLIPSIS: &str = "...";

/// Reply used for ratings outside 1..=5
pub const GENERIC_RESPONSE: &str = "Thank you for your feedback!";

/// Action list used when nothing better is known
pub const GENERIC_ACTIONS: [&str; 2] = [
  "Review feedback"
, "Take appropriate action"
];

/// Canned customer reply for a rating bucket
pub fn canned_response(rating: u8) -> &'static str
{   match rating
    {   5 => "Thank you so much for your wonderful 5-star review! \
              We're thrilled to hear about your positive experience."
      , 4 => "Thank you for your 4-star review! We appreciate your \
              feedback and are glad you had a good experience."
      , 3 => "Thank you for your review. We appreciate your feedback \
              and will work to improve your experience."
      , 2 => "Thank you for sharing your feedback. We're sorry your \
              experience wasn't better and will work to address your \
              concerns."
      , 1 => "We sincerely apologize for your experience. Your \
              feedback is important to us and we will take immediate \
              action to improve."
      , _ => GENERIC_RESPONSE
    }
}

/// Recommended admin actions for a rating bucket
pub fn fallback_actions(rating: u8) -> Vec<String>
{   let actions: &[&str] = match rating
    {   5 => &[
          "Send thank you message"
        , "Request testimonial"
        , "Offer loyalty reward"
        ]
      , 4 => &[
          "Follow up on feedback"
        , "Identify improvement areas"
        ]
      , 3 => &[
          "Investigate concerns"
        , "Follow up with customer"
        , "Review service quality"
        ]
      , 2 => &[
          "Contact customer immediately"
        , "Investigate issues"
        , "Offer compensation"
        ]
      , 1 => &[
          "Urgent: Contact customer"
        , "Escalate to management"
        , "Conduct internal review"
        ]
      , _ => &GENERIC_ACTIONS
    };
    actions.iter().map(|a| a.to_string()).collect()
}

/// Generic two-item action list
pub fn generic_actions() -> Vec<String>
{   GENERIC_ACTIONS.iter().map(|a| a.to_string()).collect()
}

/// Source text cut to `budget` characters, with an ellipsis when cut
pub fn truncate_summary(text: &str, budget: usize) -> String
{   if text.chars().count() <= budget
    {   return text.to_string();
    }
    let mut out: String = text.chars().take(budget).collect();
    out.push_str(ELLIPSIS);
    out
}
