//! Content-addressed recording filenames.
//!
//! [`crate::replay::Recorder`] writes to and [`crate::replay::Player`] reads
//! from the name produced here, so the hash and the slug rule must never
//! change independently of each other.

/// Longest argument slug kept in a filename.
///
/// The slug keeps letters and decimal digits only: alphabetic characters that
/// are not numeric (so `Ⅻ` is dropped), plus ASCII `0-9`. Fractions,
/// superscripts and non-ASCII digits are dropped too.
pub const MAX_SLUG_LEN: usize = 20;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Returns `<command>-<slug>-<hash>` for an invocation.
///
/// Path separators in `command` become `_` so the key is always a single
/// entry inside the recording directory; the hash still covers the full
/// command. The slug is the alphanumeric characters of all arguments, truncated to
/// [`MAX_SLUG_LEN`]. The hash is a 32-bit FNV-1a over stdin, command and
/// arguments, printed as 8 hex digits.
pub fn recording_key(stdin: &str, command: &str, args: &[String]) -> String {
    let mut hash = Fnv1a32::new();
    hash.update(stdin.as_bytes());
    hash.update(command.as_bytes());
    for arg in args {
        hash.update(arg.as_bytes());
    }

    format!(
        "{}-{}-{}",
        command.replace(['/', '\\'], "_"),
        slug(args),
        hex::encode(hash.finish().to_be_bytes())
    )
}

fn slug(args: &[String]) -> String {
    args.iter()
        .flat_map(|arg| arg.chars())
        .filter(|c| (c.is_alphabetic() && !c.is_numeric()) || c.is_ascii_digit())
        .take(MAX_SLUG_LEN)
        .collect()
}

struct Fnv1a32(u32);

impl Fnv1a32 {
    fn new() -> Self {
        Self(FNV_OFFSET_BASIS)
    }

    fn update(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u32::from(*byte);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }

    fn finish(&self) -> u32 {
        self.0
    }
}
