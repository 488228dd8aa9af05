//! Who submitted the comments in a batch.

use serde::Serialize;

use navi_shared::Comment;

/// Names kept for display; the counts cover every comment.
const MAX_NAMES: usize = 10;

/// Breakdown of a batch by submitter kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StakeholderTally {
    /// Comments filed on behalf of an organization.
    pub organizations: usize,
    /// Comments filed by a named individual.
    pub individuals: usize,
    /// Anonymous comments.
    pub other: usize,
    /// First distinct submitter names, in batch order.
    pub names: Vec<String>,
}

impl StakeholderTally {
    pub fn from_comments(comments: &[Comment]) -> Self {
        let mut tally = Self::default();

        for comment in comments {
            let has_org = comment
                .organization_name
                .as_deref()
                .is_some_and(|o| !o.trim().is_empty());

            let Some(name) = comment.submitter_display() else {
                tally.other += 1;
                continue;
            };

            if has_org {
                tally.organizations += 1;
            } else {
                tally.individuals += 1;
            }

            if tally.names.len() < MAX_NAMES && !tally.names.contains(&name) {
                tally.names.push(name);
            }
        }

        tally
    }

    pub fn total(&self) -> usize {
        self.organizations + self.individuals + self.other
    }
}
