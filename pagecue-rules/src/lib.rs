//! Rule and condition evaluation for pagecue.
//!
//! - [`evaluate`] / [`Operator`]: the leaf condition evaluator, mapping
//!   `(property value, operator, comparison value)` to a boolean
//! - [`match_rules`]: filters a rule collection by scope and conditions and
//!   orders it by priority
//!
//! # Example
//!
//! ```
//! use pagecue_rules::match_rules;
//! use pagecue_types::{Condition, PageContext, PropertyMap, Rule, RuleContent};
//!
//! let properties: PropertyMap = [("amount", "$50,000"), ("dealstage", "Demo")]
//!     .into_iter()
//!     .collect();
//! let rule = Rule::new("big", "Big deal", RuleContent::banner("Big deal", ""))
//!     .with_condition(Condition::new("amount", "greater_than", "25000"));
//!
//! let result = match_rules(&[rule], &properties, &PageContext::default());
//! assert_eq!(result.ids(), vec!["big"]);
//! ```

mod error;
mod matcher;
mod operator;

pub use error::{RuleError, RuleResult};
pub use matcher::{condition_holds, conditions_hold, in_scope, match_rules, MatchResult};
pub use operator::{evaluate, parse_number, Operator};
