//! Query parameters for the `add` resource

use crate::add::types::UploadOptions;
use std::collections::BTreeMap;

/// Map upload options to the `add` query parameters.
///
/// Only fields that are set are emitted; a field explicitly set to `false`
/// is sent as `"false"`. `stream-channels=true` is always present.
pub fn encode_options(options: &UploadOptions) -> BTreeMap<&'static str, String> {
    let mut params = BTreeMap::new();
    params.insert("stream-channels", true.to_string());

    if let Some(chunker) = &options.chunker {
        params.insert("chunker", chunker.clone());
    }
    if let Some(version) = options.cid_version {
        params.insert("cid-version", version.to_string());
    }
    if let Some(only_hash) = options.only_hash {
        params.insert("only-hash", only_hash.to_string());
    }
    if let Some(pin) = options.pin {
        params.insert("pin", pin.to_string());
    }
    if let Some(raw_leaves) = options.raw_leaves {
        params.insert("raw-leaves", raw_leaves.to_string());
    }
    if let Some(trickle) = options.trickle {
        params.insert("trickle", trickle.to_string());
    }
    if let Some(wrap) = options.wrap_with_directory {
        params.insert("wrap-with-directory", wrap.to_string());
    }
    if let Some(hash_alg) = &options.hash_alg {
        params.insert("hashAlg", hash_alg.clone());
    }
    if options.on_progress.is_some() {
        params.insert("progress", true.to_string());
    }

    // No wire parameter exists for these on `add`.
    if options.experimental_sharding.is_some() || options.shard_split_threshold.is_some() {
        log::warn!("Sharding options are not sent with add requests and will be ignored");
    }

    params
}
