//! Flattened device-tree binary format
//!
//! Header fields are big-endian u32. The structure block is a token stream
//! (BEGIN_NODE, PROP, END_NODE, NOP, END) padded to 4 bytes; property names
//! live in the strings block and are referenced by offset.

use super::node::{FitNode, Property};
use crate::error::AccessorError;
use std::collections::HashMap;

pub const FDT_MAGIC: u32 = 0xd00d_feed;
const FDT_BEGIN_NODE: u32 = 0x1;
const FDT_END_NODE: u32 = 0x2;
const FDT_PROP: u32 = 0x3;
const FDT_NOP: u32 = 0x4;
const FDT_END: u32 = 0x9;

const HEADER_SIZE: usize = 40;
const VERSION: u32 = 17;
const LAST_COMP_VERSION: u32 = 16;
/// Oldest blob version accepted
const MIN_VERSION: u32 = 16;

/// Parsed header
#[derive(Debug, Clone, Copy)]
struct Header {
    total_size: usize,
    off_dt_struct: usize,
    off_dt_strings: usize,
    size_dt_strings: usize,
}

fn malformed(reason: impl Into<String>) -> AccessorError {
    AccessorError::MalformedBlob(reason.into())
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32, AccessorError> {
    data.get(offset..offset + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| malformed(format!("truncated at offset {}", offset)))
}

fn align4(n: usize) -> usize {
    (n + 3) & !3
}

fn parse_header(data: &[u8]) -> Result<Header, AccessorError> {
    if data.len() < HEADER_SIZE {
        return Err(malformed("shorter than the header"));
    }
    let magic = read_u32(data, 0)?;
    if magic != FDT_MAGIC {
        return Err(malformed(format!("bad magic {:#010x}", magic)));
    }
    let version = read_u32(data, 20)?;
    if version < MIN_VERSION {
        return Err(malformed(format!("unsupported version {}", version)));
    }
    let header = Header {
        total_size: read_u32(data, 4)? as usize,
        off_dt_struct: read_u32(data, 8)? as usize,
        off_dt_strings: read_u32(data, 12)? as usize,
        size_dt_strings: read_u32(data, 32)? as usize,
    };
    if header.total_size > data.len() {
        return Err(malformed(format!(
            "header claims {} bytes, blob has {}",
            header.total_size,
            data.len()
        )));
    }
    if header.off_dt_strings + header.size_dt_strings > header.total_size {
        return Err(malformed("strings block exceeds blob"));
    }
    Ok(header)
}

/// Parse a blob into an owned tree rooted at `/`.
pub fn parse(data: &[u8]) -> Result<FitNode, AccessorError> {
    let header = parse_header(data)?;
    let data = &data[..header.total_size];
    let strings =
        &data[header.off_dt_strings..header.off_dt_strings + header.size_dt_strings];

    let mut offset = header.off_dt_struct;
    let mut stack: Vec<FitNode> = Vec::new();
    let mut root: Option<FitNode> = None;

    loop {
        let token = read_u32(data, offset)?;
        offset += 4;
        match token {
            FDT_BEGIN_NODE => {
                let name = read_cstr(data, offset)?;
                offset = align4(offset + name.len() + 1);
                if root.is_some() {
                    return Err(malformed("node after the root closed"));
                }
                stack.push(FitNode::new(name));
            }
            FDT_PROP => {
                let len = read_u32(data, offset)? as usize;
                let name_off = read_u32(data, offset + 4)? as usize;
                offset += 8;
                let value = data
                    .get(offset..offset + len)
                    .ok_or_else(|| malformed("property value truncated"))?
                    .to_vec();
                offset = align4(offset + len);
                let name = read_cstr(strings, name_off)?;
                let node = stack
                    .last_mut()
                    .ok_or_else(|| malformed("property outside any node"))?;
                node.properties.push(Property { name, data: value });
            }
            FDT_END_NODE => {
                let node = stack
                    .pop()
                    .ok_or_else(|| malformed("unbalanced END_NODE"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            FDT_NOP => {}
            FDT_END => break,
            other => return Err(malformed(format!("unknown token {:#x}", other))),
        }
    }

    if !stack.is_empty() {
        return Err(malformed("END reached with open nodes"));
    }
    root.ok_or_else(|| malformed("no root node"))
}

fn read_cstr(data: &[u8], offset: usize) -> Result<String, AccessorError> {
    let tail = data
        .get(offset..)
        .ok_or_else(|| malformed(format!("string offset {} out of range", offset)))?;
    let end = tail
        .iter()
        .position(|b| *b == 0)
        .ok_or_else(|| malformed("unterminated string"))?;
    String::from_utf8(tail[..end].to_vec()).map_err(|_| malformed("non UTF-8 name"))
}

/// Serialize a tree to a version 17 blob with an empty reservation map.
pub fn serialize(root: &FitNode) -> Vec<u8> {
    let mut structure = Vec::new();
    let mut strings = Vec::new();
    let mut string_offsets = HashMap::new();
    write_node(root, &mut structure, &mut strings, &mut string_offsets);
    structure.extend_from_slice(&FDT_END.to_be_bytes());

    let off_mem_rsvmap = HEADER_SIZE;
    let off_dt_struct = off_mem_rsvmap + 16;
    let off_dt_strings = off_dt_struct + structure.len();
    let total_size = off_dt_strings + strings.len();

    let mut out = Vec::with_capacity(total_size);
    for field in [
        FDT_MAGIC,
        total_size as u32,
        off_dt_struct as u32,
        off_dt_strings as u32,
        off_mem_rsvmap as u32,
        VERSION,
        LAST_COMP_VERSION,
        0,
        strings.len() as u32,
        structure.len() as u32,
    ] {
        out.extend_from_slice(&field.to_be_bytes());
    }
    out.extend_from_slice(&[0u8; 16]);
    out.extend_from_slice(&structure);
    out.extend_from_slice(&strings);
    out
}

fn write_node(
    node: &FitNode,
    out: &mut Vec<u8>,
    strings: &mut Vec<u8>,
    offsets: &mut HashMap<String, u32>,
) {
    out.extend_from_slice(&FDT_BEGIN_NODE.to_be_bytes());
    out.extend_from_slice(node.name.as_bytes());
    out.push(0);
    pad(out);

    for prop in &node.properties {
        let name_off = *offsets.entry(prop.name.clone()).or_insert_with(|| {
            let off = strings.len() as u32;
            strings.extend_from_slice(prop.name.as_bytes());
            strings.push(0);
            off
        });
        out.extend_from_slice(&FDT_PROP.to_be_bytes());
        out.extend_from_slice(&(prop.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&name_off.to_be_bytes());
        out.extend_from_slice(&prop.data);
        pad(out);
    }

    for child in &node.children {
        write_node(child, out, strings, offsets);
    }
    out.extend_from_slice(&FDT_END_NODE.to_be_bytes());
}

fn pad(out: &mut Vec<u8>) {
    out.resize(align4(out.len()), 0);
}
