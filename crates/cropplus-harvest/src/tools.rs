//! Tool classification, tiers, and allow-list evaluation.
//!
//! Only hoes have a tier. Anything else ranks below every tier, so it
//! never satisfies a minimum-tier requirement.

use cropplus_types::{HoeMaterial, ItemId};

use crate::policy::ToolPolicy;

/// Allow-list wildcard matching any hoe.
pub const ANY_HOE: &str = "ANY_HOE";

/// Result of checking a held item against a [`ToolPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolVerdict {
    /// The item passes.
    Allowed,
    /// The hand is empty and bare hands are not allowed.
    BareHandsDenied {
        /// Label of what would be accepted.
        required: String,
    },
    /// The item is not in the allow-list.
    ToolDenied {
        /// Label of what would be accepted.
        required: String,
    },
}

/// Stateless tool policy evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolPolicyResolver;

impl ToolPolicyResolver {
    /// Whether `held` matches `allowed`. An empty list allows everything;
    /// [`ANY_HOE`] matches every hoe material.
    pub fn is_tool_allowed(held: &ItemId, allowed: &[String]) -> bool {
        if allowed.is_empty() {
            return true;
        }
        allowed.iter().any(|entry| {
            let entry = entry.trim();
            entry.eq_ignore_ascii_case(held.as_str())
                || (entry.eq_ignore_ascii_case(ANY_HOE) && HoeMaterial::from_item(held).is_some())
        })
    }

    /// Tier of `held`, or `None` if it is not a hoe.
    pub fn tool_tier(held: &ItemId) -> Option<u8> {
        HoeMaterial::from_item(held).map(HoeMaterial::tier)
    }

    /// Whether `held` is a hoe of at least `minimum_tier`. Unknown tier
    /// names count as tier 0, so any hoe satisfies them.
    pub fn tier_meets(held: &ItemId, minimum_tier: &str) -> bool {
        let required = HoeMaterial::from_tier_name(minimum_tier).map_or(0, HoeMaterial::tier);
        Self::tool_tier(held).is_some_and(|tier| tier >= required)
    }

    /// Human label for a tool denial message.
    pub fn required_tool_label(allowed: &[String]) -> String {
        match allowed.first() {
            None => String::from("any tool"),
            Some(_) if allowed.iter().any(|t| t.trim().eq_ignore_ascii_case(ANY_HOE)) => {
                String::from("hoe")
            }
            Some(first) => ItemId::new(first).humanize(),
        }
    }

    /// Evaluate `held` against the effective tool policy.
    pub fn check(held: &ItemId, policy: &ToolPolicy) -> ToolVerdict {
        if !policy.restricted {
            return ToolVerdict::Allowed;
        }
        if held.is_air() {
            return if policy.allow_bare_hands {
                ToolVerdict::Allowed
            } else {
                ToolVerdict::BareHandsDenied {
                    required: Self::required_tool_label(&policy.allowed_tools),
                }
            };
        }
        if Self::is_tool_allowed(held, &policy.allowed_tools) {
            ToolVerdict::Allowed
        } else {
            ToolVerdict::ToolDenied {
                required: Self::required_tool_label(&policy.allowed_tools),
            }
        }
    }
}
