/// Audio encoding requested from the synthesis provider, uniform for a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    /// Raw 16-bit little-endian mono samples
    Linear16,
    Mp3,
    /// Ogg container (Opus on Google, Vorbis on Polly)
    Ogg,
}

impl AudioEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioEncoding::Linear16 => "LINEAR16",
            AudioEncoding::Mp3 => "MP3",
            AudioEncoding::Ogg => "OGG_OPUS",
        }
    }

    /// File extension used for staged fragments and the final output
    pub fn extension(&self) -> &'static str {
        match self {
            AudioEncoding::Linear16 => "wav",
            AudioEncoding::Mp3 => "mp3",
            AudioEncoding::Ogg => "ogg",
        }
    }

    pub fn is_compressed(&self) -> bool {
        !matches!(self, AudioEncoding::Linear16)
    }
}

impl std::str::FromStr for AudioEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LINEAR16" | "PCM" | "WAV" => Ok(AudioEncoding::Linear16),
            "MP3" => Ok(AudioEncoding::Mp3),
            "OGG_OPUS" | "OGG" | "OGG_VORBIS" => Ok(AudioEncoding::Ogg),
            other => Err(format!("unsupported audio encoding: {}", other)),
        }
    }
}

impl std::fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Voice selection sent with every request
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceParams {
    /// BCP-47 language tag, e.g. `en-US`
    pub language: String,
    pub name: String,
}

/// Audio configuration sent with every request
#[derive(Debug, Clone, PartialEq)]
pub struct AudioParams {
    pub encoding: AudioEncoding,
    pub speaking_rate: f32,
    pub pitch: f32,
    /// Only meaningful for [`AudioEncoding::Linear16`]
    pub sample_rate_hz: u32,
}

/// Payload transmitted to the synthesis provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisInput {
    Text(String),
    Markup(String),
}

impl SynthesisInput {
    pub fn as_str(&self) -> &str {
        match self {
            SynthesisInput::Text(text) | SynthesisInput::Markup(text) => text,
        }
    }

    /// Exact byte length of what goes over the wire
    pub fn wire_size(&self) -> usize {
        self.as_str().len()
    }

    pub fn is_markup(&self) -> bool {
        matches!(self, SynthesisInput::Markup(_))
    }
}

/// A request-sized slice of the document, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    /// Source text covered by this chunk
    pub text: String,
    pub payload: SynthesisInput,
}

impl Chunk {
    pub fn wire_size(&self) -> usize {
        self.payload.wire_size()
    }
}

/// Audio returned by the provider for exactly one chunk
#[derive(Debug, Clone)]
pub struct AudioFragment {
    pub chunk_index: usize,
    pub encoding: AudioEncoding,
    pub sample_rate_hz: u32,
    pub bytes: Vec<u8>,
}
