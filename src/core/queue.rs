// Copyright 2022 ComposableFi
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::error::Error;
use crate::{link::endpoint::Endpoint, primitives::Chain};
use ibc_proto::google::protobuf::Any;

/// Messages handled by one call to [`flush_message_batch`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Messages included in a committed transaction
    pub submitted: usize,
    /// Messages in transactions the chain refused as already relayed
    pub rejected: usize,
    pub transactions: usize,
}

/// Number of messages per transaction so that each transaction stays within the block
/// weight limit, assuming messages of similar weight.
pub fn chunk_size(len: usize, batch_weight: u64, block_max_weight: u64) -> usize {
    let block_max_weight = block_max_weight.max(1);
    let chunks = (batch_weight / block_max_weight
        + u64::from(batch_weight % block_max_weight != 0))
    .max(1) as usize;
    ((len + chunks - 1) / chunks).max(1)
}

/// This sends messages to the sink chain in a gas-aware manner. Transactions the chain
/// rejects as redundant are counted and skipped; any other failure aborts the flush.
pub async fn flush_message_batch<C: Chain>(
    msgs: Vec<Any>,
    sink: &Endpoint<C>,
) -> Result<BatchOutcome, Error> {
    let mut outcome = BatchOutcome::default();
    if msgs.is_empty() {
        return Ok(outcome);
    }
    let block_max_weight = sink.chain().block_max_weight();
    let batch_weight = sink.estimate_weight(msgs.clone()).await?;
    let chunk = chunk_size(msgs.len(), batch_weight, block_max_weight);

    if chunk < msgs.len() {
        // whelp our batch exceeds the block max weight.
        log::info!(
            target: "packet-relayer",
            "🏗️ Splitting batch of {} messages for {} into chunks of {}",
            msgs.len(),
            sink.chain().name(),
            chunk
        );
    }
    for batch in msgs.chunks(chunk) {
        log::debug!(target: "packet-relayer", "📡 Sending batch of {} messages to {}", batch.len(), sink.chain().name());
        match sink.submit(batch.to_vec()).await {
            Ok(tx) => {
                log::info!(target: "packet-relayer", "🤝 Transaction confirmed on {} at height {} with hash: {}", sink.chain().name(), tx.height, tx.hash);
                outcome.submitted += batch.len();
                outcome.transactions += 1;
            }
            Err(e) if e.is_reject() => {
                log::info!(target: "packet-relayer", "🙅 {}", e);
                outcome.rejected += batch.len();
            }
            Err(e) => {
                log::warn!(target: "packet-relayer", "⚠️ Failed to submit {} messages: {}", batch.len(), e);
                return Err(e)
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_within_block_is_not_split() {
        assert_eq!(chunk_size(10, 500, 1000), 10);
        assert_eq!(chunk_size(10, 1000, 1000), 10);
        assert_eq!(chunk_size(1, 0, 0), 1);
    }

    #[test]
    fn oversized_batch_is_split_evenly() {
        // 2.5 blocks worth of messages need three transactions
        assert_eq!(chunk_size(10, 2500, 1000), 4);
        assert_eq!(chunk_size(9, 2001, 1000), 3);
        // a single message heavier than a block still goes out alone
        assert_eq!(chunk_size(3, 9000, 1000), 1);
    }
}
