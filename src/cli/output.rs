//! Output formatting utilities for CLI operations.

use std::io::{self, Write};

use greenroom::github::{Contributor, PullRequest};
use greenroom::{CloudFunction, LambdaFunction, PullRequestStatistics};

use super::CliError;

/// Pagination facts shown under a pull request listing.
#[derive(Debug, Clone, Copy)]
pub struct ListingPagination {
    /// Zero-indexed view page.
    pub page: u32,
    /// Rows per page.
    pub page_size: u8,
    /// Total row count hint from the transport.
    pub total: u64,
}

impl ListingPagination {
    /// Number of view pages implied by the total hint, at least one.
    #[must_use]
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 || self.total == 0 {
            1
        } else {
            self.total.div_ceil(u64::from(self.page_size))
        }
    }
}

/// Writes a pull request listing to the given writer.
pub fn write_pull_request_listing<W: Write>(
    writer: &mut W,
    items: &[PullRequest],
    pagination: &ListingPagination,
    owner: &str,
    repo: &str,
) -> Result<(), CliError> {
    writeln!(writer, "Pull requests for {owner}/{repo}:").map_err(|e| io_error(&e))?;
    writeln!(writer).map_err(|e| io_error(&e))?;

    for pr in items {
        writeln!(writer, "  #{} {} ({})", pr.number, pr.title, pr.url).map_err(|e| io_error(&e))?;
    }

    writeln!(writer).map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "Page {} of {} ({} PRs shown)",
        u64::from(pagination.page) + 1,
        pagination.page_count(),
        items.len()
    )
    .map_err(|e| io_error(&e))
}

/// Writes a pull request statistics summary to the given writer.
pub fn write_statistics<W: Write>(
    writer: &mut W,
    statistics: &PullRequestStatistics,
    owner: &str,
    repo: &str,
) -> Result<(), CliError> {
    writeln!(writer, "Pull request statistics for {owner}/{repo}:").map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "  Average time to merge: {}",
        statistics.average_time_to_merge
    )
    .map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "  Average size in lines: {}",
        statistics.average_size_in_lines
    )
    .map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "  Merged to closed:      {}",
        statistics.merged_to_closed_ratio
    )
    .map_err(|e| io_error(&e))
}

/// Writes a contributor listing to the given writer.
pub fn write_contributors<W: Write>(
    writer: &mut W,
    contributors: &[Contributor],
    owner: &str,
    repo: &str,
) -> Result<(), CliError> {
    writeln!(writer, "Contributors for {owner}/{repo}:").map_err(|e| io_error(&e))?;

    for contributor in contributors {
        writeln!(
            writer,
            "  @{} ({} contributions)",
            contributor.login, contributor.contributions
        )
        .map_err(|e| io_error(&e))?;
    }

    writeln!(writer, "{} contributors shown", contributors.len()).map_err(|e| io_error(&e))
}

/// Writes a Lambda function listing to the given writer.
pub fn write_lambda_listing<W: Write>(
    writer: &mut W,
    functions: &[LambdaFunction],
    region: &str,
) -> Result<(), CliError> {
    writeln!(writer, "Lambda functions in {region}:").map_err(|e| io_error(&e))?;

    for function in functions {
        writeln!(
            writer,
            "  {} [{}] {} MB, {} bytes, modified {}",
            function.function_name,
            function.runtime,
            function.memory,
            function.code_size,
            function.last_modified
        )
        .map_err(|e| io_error(&e))?;
    }

    writeln!(writer, "{} functions shown", functions.len()).map_err(|e| io_error(&e))
}

/// Writes a Cloud Functions listing to the given writer.
pub fn write_functions_listing<W: Write>(
    writer: &mut W,
    functions: &[CloudFunction],
    project: &str,
) -> Result<(), CliError> {
    writeln!(writer, "Cloud Functions in {project}:").map_err(|e| io_error(&e))?;

    for function in functions {
        writeln!(
            writer,
            "  {} [{}] {} in {}, {} MB, updated {}",
            function.name,
            function.runtime,
            function.status,
            function.region,
            function.available_memory_mb,
            function.update_time
        )
        .map_err(|e| io_error(&e))?;
    }

    writeln!(writer, "{} functions shown", functions.len()).map_err(|e| io_error(&e))
}

/// Converts an I/O error to a [`CliError::Io`].
pub(crate) fn io_error(error: &io::Error) -> CliError {
    CliError::Io {
        message: error.to_string(),
    }
}
