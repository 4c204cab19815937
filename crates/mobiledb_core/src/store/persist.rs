//! Table <-> store file conversion.

use crate::entity::{Entity, Envelope, EnvelopeRef};
use crate::error::{CoreError, CoreResult};
use crate::table::RecordTable;
use mobiledb_codec::{decode_each, LineEncoder};

/// Serializes every record as one envelope line, in table order.
pub(crate) fn encode_table<E: Entity>(table: &RecordTable<E>) -> CoreResult<Vec<u8>> {
    let mut encoder = LineEncoder::new(Vec::new());
    for record in table.records() {
        encoder.encode(&EnvelopeRef::from(record))?;
    }
    Ok(encoder.into_inner())
}

/// Rebuilds a table from store file bytes.
///
/// Each line is parsed on its own. A duplicate identity, or (with
/// `verify_identity`) an identity that disagrees with the payload's key,
/// is corruption.
pub(crate) fn decode_table<E: Entity>(
    bytes: &[u8],
    verify_identity: bool,
) -> CoreResult<RecordTable<E>> {
    let mut table = RecordTable::new();

    for result in decode_each::<Envelope<E>>(bytes) {
        let (line, envelope) = result?;

        if verify_identity {
            let derived = envelope.entity.key();
            if derived != envelope.identity {
                return Err(CoreError::corrupted(format!(
                    "line {line}: identity {} does not match entity key {derived}",
                    envelope.identity
                )));
            }
        }

        table
            .insert_loaded(envelope.into_record())
            .map_err(|e| CoreError::corrupted(format!("line {line}: {e}")))?;
    }

    Ok(table)
}
