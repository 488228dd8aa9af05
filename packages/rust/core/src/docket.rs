//! Docket id derivation from a document id.

/// Fewest dash tokens a document id needs before it names a docket.
const MIN_DOCKET_TOKENS: usize = 3;

/// Derive the owning docket of a document id.
///
/// Document ids are the docket id plus a trailing sequence token
/// (`EPA-HQ-OAR-2021-0317` + `-0001`). Ids with fewer than three tokens name
/// no docket; a bare three-token id (`AGENCY-YEAR-NUMBER`) is taken as the
/// docket itself. Pure and total: no I/O, never panics.
pub fn derive_docket_id(document_id: &str) -> Option<String> {
    let tokens: Vec<&str> = document_id.split('-').collect();

    match tokens.len() {
        n if n < MIN_DOCKET_TOKENS => None,
        MIN_DOCKET_TOKENS => Some(document_id.to_string()),
        n => Some(tokens[..n - 1].join("-")),
    }
}
