
use crate::chunk::ChunkMessage;

pub const CMD_PLAY: &[u8] = b"play";
pub const CMD_PUBLISH: &[u8] = b"publish";
pub const STATUS_MARKER: &[u8] = b"onStatus";
pub const PLAY_START_MARKER: &[u8] = b"NetStream.Play.Start";
pub const PUBLISH_START_MARKER: &[u8] = b"NetStream.Publish.Start";

const STREAM_BEGIN_LENGTH: usize = 6;

// Substring tests on the raw AMF payload, not token matching: the AMF
// encoding puts length prefixes directly against these markers, so word
// boundaries would never match.
impl ChunkMessage {
    /// A viewer asking the service to play the keyed stream.
    pub fn is_play_request(&self, stream_key: &[u8]) -> bool {
        contains(&self.payload, CMD_PLAY) && contains(&self.payload, stream_key)
    }

    /// The service confirming playback to the viewer.
    pub fn is_play_start(&self) -> bool {
        contains(&self.payload, STATUS_MARKER) && contains(&self.payload, PLAY_START_MARKER)
    }

    /// A broadcaster asking the service to ingest the keyed stream.
    pub fn is_publish_request(&self, stream_key: &[u8]) -> bool {
        contains(&self.payload, CMD_PUBLISH) && contains(&self.payload, stream_key)
    }

    /// The service confirming ingest to the broadcaster.
    pub fn is_publish_start(&self) -> bool {
        contains(&self.payload, STATUS_MARKER) && contains(&self.payload, PUBLISH_START_MARKER)
    }

    /// A user-control Stream Begin probe: declared length exactly 6 with a
    /// zero event-type prefix.
    pub fn is_stream_begin(&self) -> bool {
        self.message_length == Some(STREAM_BEGIN_LENGTH)
            && self.payload.len() >= 2
            && self.payload[0] == 0x00
            && self.payload[1] == 0x00
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}
