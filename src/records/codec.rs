use super::*;
use crate::ID;
use crate::ReplayError;
use byteorder::BigEndian;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;

/// Leading bytes of every serialized replay.
pub const MAGIC: &[u8; 4] = b"TCGR";
/// Envelope version understood by this build.
pub const VERSION: u16 = 1;

const STATES: u8 = 0b01;
const ACTIONS: u8 = 0b10;

// Envelope, big endian:
// magic[4] version:u16 flags:u8 created:i64 seed:u64 winner:u8
// player1 player2 (user:u64 name:str) decks (n:u8, per deck n:u16 str*)
// entries (n:u32, per entry tag:u8 len:u32 json[len])
// str = len:u16 utf8[len]

impl Replay {
    pub fn serialize(&self) -> Vec<u8> {
        self.encode()
            .expect("writes into a Vec and serde_json values of plain data do not fail")
    }

    /// Decodes a whole replay or nothing. Trailing bytes are rejected.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, ReplayError> {
        let ref mut cursor = Cursor::new(bytes);
        let mut magic = [0u8; 4];
        cursor.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(ReplayError::Corrupt(String::from("bad magic")));
        }
        let version = cursor.read_u16::<BigEndian>()?;
        if version != VERSION {
            return Err(ReplayError::Corrupt(format!("unknown version {}", version)));
        }
        let flags = cursor.read_u8()?;
        if flags & !(STATES | ACTIONS) != 0 {
            return Err(ReplayError::Corrupt(format!("unknown flags {:#04b}", flags)));
        }
        let capture = Capture {
            states: flags & STATES != 0,
            actions: flags & ACTIONS != 0,
        };
        if !capture.is_playable() {
            return Err(ReplayError::Corrupt(String::from("no capture mode")));
        }
        let created = cursor.read_i64::<BigEndian>()?;
        let seed = cursor.read_u64::<BigEndian>()?;
        let winner = match cursor.read_u8()? {
            0 => Winner::None,
            1 => Winner::Player1,
            2 => Winner::Player2,
            3 => Winner::Draw,
            w => return Err(ReplayError::Corrupt(format!("unknown winner {}", w))),
        };
        let player1 = read_player(cursor)?;
        let player2 = read_player(cursor)?;
        let decks = (0..cursor.read_u8()?)
            .map(|_| {
                let n = cursor.read_u16::<BigEndian>()?;
                (0..n).map(|_| read_str(cursor)).collect()
            })
            .collect::<Result<Vec<Vec<String>>, ReplayError>>()?;
        let count = cursor.read_u32::<BigEndian>()?;
        let entries = (0..count)
            .map(|_| read_entry(cursor))
            .collect::<Result<Vec<Entry>, ReplayError>>()?;
        if cursor.position() as usize != bytes.len() {
            return Err(ReplayError::Corrupt(String::from("trailing bytes")));
        }
        Ok(Self {
            player1,
            player2,
            winner,
            created,
            capture,
            seed,
            decks,
            entries,
        })
    }

    fn encode(&self) -> std::io::Result<Vec<u8>> {
        let mut out = Vec::new();
        out.write_all(MAGIC)?;
        out.write_u16::<BigEndian>(VERSION)?;
        out.write_u8(
            (self.capture.states as u8 * STATES) | (self.capture.actions as u8 * ACTIONS),
        )?;
        out.write_i64::<BigEndian>(self.created)?;
        out.write_u64::<BigEndian>(self.seed)?;
        out.write_u8(match self.winner {
            Winner::None => 0,
            Winner::Player1 => 1,
            Winner::Player2 => 2,
            Winner::Draw => 3,
        })?;
        write_player(&mut out, &self.player1)?;
        write_player(&mut out, &self.player2)?;
        out.write_u8(self.decks.len() as u8)?;
        for deck in &self.decks {
            out.write_u16::<BigEndian>(deck.len() as u16)?;
            for card in deck {
                write_str(&mut out, card)?;
            }
        }
        out.write_u32::<BigEndian>(self.entries.len() as u32)?;
        for entry in &self.entries {
            let body = serde_json::to_vec(entry)?;
            out.write_u8(entry.tag())?;
            out.write_u32::<BigEndian>(body.len() as u32)?;
            out.write_all(&body)?;
        }
        Ok(out)
    }
}

fn write_str(out: &mut Vec<u8>, s: &str) -> std::io::Result<()> {
    let bytes = &s.as_bytes()[..s.len().min(u16::MAX as usize)];
    out.write_u16::<BigEndian>(bytes.len() as u16)?;
    out.write_all(bytes)
}

fn write_player(out: &mut Vec<u8>, player: &ReplayPlayer) -> std::io::Result<()> {
    out.write_u64::<BigEndian>(player.user.inner())?;
    write_str(out, &player.name)
}

fn read_str(cursor: &mut Cursor<&[u8]>) -> Result<String, ReplayError> {
    let len = cursor.read_u16::<BigEndian>()? as usize;
    let mut buf = vec![0u8; len];
    cursor.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| ReplayError::Corrupt(e.to_string()))
}

fn read_player(cursor: &mut Cursor<&[u8]>) -> Result<ReplayPlayer, ReplayError> {
    let user = ID::new(cursor.read_u64::<BigEndian>()?);
    let name = read_str(cursor)?;
    Ok(ReplayPlayer { user, name })
}

fn read_entry(cursor: &mut Cursor<&[u8]>) -> Result<Entry, ReplayError> {
    let tag = cursor.read_u8()?;
    let len = cursor.read_u32::<BigEndian>()? as usize;
    let remaining = cursor.get_ref().len() - cursor.position() as usize;
    if len > remaining {
        return Err(ReplayError::Corrupt(String::from("entry overruns buffer")));
    }
    let mut body = vec![0u8; len];
    cursor.read_exact(&mut body)?;
    let entry = serde_json::from_slice::<Entry>(&body)?;
    match entry.tag() == tag {
        true => Ok(entry),
        false => Err(ReplayError::Corrupt(format!("entry tag {} mismatch", tag))),
    }
}
