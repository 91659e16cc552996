use packet_relayer::core::logging;
use packet_relayer::testsuite::tests::*;

#[tokio::test(flavor = "multi_thread")]
async fn mock_mock() {
    logging::setup_logging();

    // packets and acks, with full events and with raw logs only
    relay_packets_and_acks_both_ways(false).await;
    relay_packets_and_acks_both_ways(true).await;

    // timeouts
    timeout_packet_by_height().await;
    timeout_after_refused_receive().await;
    defer_timeout_until_client_catches_up().await;

    // clients
    update_stale_clients().await;

    // failures
    retry_transient_failures().await;
    count_rejections_and_retry_later().await;
    surface_malformed_events().await;

    // batching, filtering and cursors
    split_batches_by_block_weight().await;
    relay_whitelisted_channels_only().await;
    resume_from_relayed_heights().await;
    relay_one_direction_at_a_time().await;
    charge_sink_budget_for_receipt_queries().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn link_setup() {
    logging::setup_logging();
    reject_invalid_links().await;
    prepare_links_from_config().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn continuous_relay() {
    logging::setup_logging();
    relay_continuously_until_cancelled().await;
    keep_polling_after_failed_cycles().await;
    stop_on_fatal_errors().await;
}
