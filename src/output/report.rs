//! Crawl report formatting

use crate::crawler::CrawlReport;

/// Formats a crawl report for the terminal
pub fn format_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Report ===\n\n");
    out.push_str(&format!(
        "Window: {} .. {}\n",
        report.start_date, report.end_date
    ));
    out.push_str(&format!("Workers: {}\n", report.num_workers));
    out.push_str(&format!(
        "Elapsed: {:.1}s\n\n",
        report.elapsed.as_secs_f64()
    ));

    let Some(total) = report.total_items else {
        out.push_str("Initial search failed: no documents crawled\n");
        return out;
    };

    out.push_str(&format!("Pages: {}\n", report.page_count));
    out.push_str(&format!("Skipped documents: {}\n", report.skipped_documents));

    if !report.failed_pages.is_empty() {
        let pages: Vec<String> = report.failed_pages.iter().map(u32::to_string).collect();
        out.push_str(&format!(
            "Failed pages ({}): {}\n",
            report.failed_pages.len(),
            pages.join(", ")
        ));
    }

    if report.cancelled {
        out.push_str("Crawl was cancelled before completion\n");
    }

    let rate = if total > 0 {
        (report.fetched as f64 / total as f64) * 100.0
    } else {
        100.0
    };
    out.push_str(&format!(
        "\nFetched: {} / {} documents ({:.1}%)\n",
        report.fetched, total, rate
    ));

    out
}

/// Prints a crawl report to stdout
pub fn print_report(report: &CrawlReport) {
    print!("{}", format_report(report));
}
