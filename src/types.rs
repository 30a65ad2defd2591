/// Identifier of a research job.
/// Examples: `1`, `42`
pub type JobId = u64;
/// Sequence number of a record within its job (`0..volume`).
/// Examples: `0`, `49_999`
pub type RecordSeq = u64;
/// Stable category label exported with records and artifacts.
/// Examples: `social`, `north_america`, `negative`
pub type Label = &'static str;
/// Topic phrase supplied by the user.
/// Example: `battery tech`
pub type Phrase = String;
/// Short display text attached to a record.
/// Example: `[news] battery tech: analysts see steady growth`
pub type Snippet = String;
/// Status or failure message attached to a job.
/// Examples: `cancelled`, `store unavailable`
pub type JobMessage = String;
/// Chart name used by exports.
/// Examples: `sentiment`, `timeline`
pub type ChartName = String;
