use volley::metrics::RunSummary;

pub(super) fn print_summary(summary: &RunSummary) {
    println!();
    if summary.stopped {
        println!("Run stopped early.");
    }
    println!("Duration: {}ms", summary.total_time_ms);
    println!(
        "Requests: {} completed of {} requested",
        summary.total_requests, summary.requested_requests
    );
    println!(
        "Successful: {} ({}%)",
        summary.successful_requests, summary.success_rate
    );
    println!("Failed: {}", summary.failed_requests);
    println!("Requests/sec: {}", summary.requests_per_second);
    println!("Avg Latency: {}ms", summary.avg_response_time);
    println!(
        "Min/Max Latency: {}ms / {}ms",
        summary.min_response_time, summary.max_response_time
    );
    println!(
        "P50/P90/P95/P99: {}ms / {}ms / {}ms / {}ms",
        summary.percentiles.p50,
        summary.percentiles.p90,
        summary.percentiles.p95,
        summary.percentiles.p99
    );
    println!("Data Received: {} bytes", summary.total_bytes);

    if !summary.status_codes.is_empty() {
        println!("Status Codes:");
        for (status, count) in &summary.status_codes {
            println!("  {}: {}", status, count);
        }
    }
    if !summary.errors.is_empty() {
        println!("Errors:");
        for (label, count) in &summary.errors {
            println!("  {}: {}", label, count);
        }
    }
}
