use crate::texture_pipeline::common::error::Result;
use crate::texture_pipeline::volume::Volume;

pub trait ChannelVolumeReader {
    /// Decodes one single-channel volume from the bytes of a channel file.
    fn read_volume(&self, data: &[u8]) -> Result<Volume>;
}
