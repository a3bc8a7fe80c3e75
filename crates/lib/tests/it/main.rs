/*! Integration tests for Arbor.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - store: End-to-end tests for path-addressed reads and writes
 * - version: Tests for checkpointing and restore
 * - codec: Tests for the snapshot and structured-text codecs
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("arbor=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod codec;
mod helpers;
mod store;
mod version;
