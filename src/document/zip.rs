//! Deterministic ZIP writer. Entries are stored uncompressed in input
//! order with zeroed DOS timestamps, so the archive bytes depend only on
//! the entry names and contents.

/// CRC-32, reflected IEEE polynomial, 256-entry lookup table.
const CRC_TABLE: [u32; 256] = build_crc_table();

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut index = 0;
    while index < 256 {
        let mut crc = index as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 == 1 {
                0xedb8_8320 ^ (crc >> 1)
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[index] = crc;
        index += 1;
    }
    table
}

pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xffff_ffff_u32;
    for &byte in data {
        crc = CRC_TABLE[((crc ^ byte as u32) & 0xff) as usize] ^ (crc >> 8);
    }
    crc ^ 0xffff_ffff
}

#[derive(Debug, Clone)]
pub struct ZipEntry {
    pub name: String,
    pub data: Vec<u8>,
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Pack the entries into a ZIP archive using the "store" method only.
pub fn build_archive(entries: &[ZipEntry]) -> Vec<u8> {
    let mut local_section: Vec<u8> = Vec::new();
    let mut central_section: Vec<u8> = Vec::new();

    for entry in entries {
        let name = entry.name.as_bytes();
        let checksum = crc32(&entry.data);
        let local_offset = local_section.len() as u32;

        // Local file header.
        put_u32(&mut local_section, 0x0403_4b50);
        put_u16(&mut local_section, 20); // version needed
        put_u16(&mut local_section, 0); // flags
        put_u16(&mut local_section, 0); // method: stored
        put_u16(&mut local_section, 0); // mod time
        put_u16(&mut local_section, 0); // mod date
        put_u32(&mut local_section, checksum);
        put_u32(&mut local_section, entry.data.len() as u32); // compressed
        put_u32(&mut local_section, entry.data.len() as u32); // uncompressed
        put_u16(&mut local_section, name.len() as u16);
        put_u16(&mut local_section, 0); // extra length
        local_section.extend_from_slice(name);
        local_section.extend_from_slice(&entry.data);

        // Central directory record, mirroring the local header plus offset.
        put_u32(&mut central_section, 0x0201_4b50);
        put_u16(&mut central_section, 20); // version made by
        put_u16(&mut central_section, 20); // version needed
        put_u16(&mut central_section, 0); // flags
        put_u16(&mut central_section, 0); // method
        put_u16(&mut central_section, 0); // mod time
        put_u16(&mut central_section, 0); // mod date
        put_u32(&mut central_section, checksum);
        put_u32(&mut central_section, entry.data.len() as u32);
        put_u32(&mut central_section, entry.data.len() as u32);
        put_u16(&mut central_section, name.len() as u16);
        put_u16(&mut central_section, 0); // extra length
        put_u16(&mut central_section, 0); // comment length
        put_u16(&mut central_section, 0); // disk number start
        put_u16(&mut central_section, 0); // internal attributes
        put_u32(&mut central_section, 0); // external attributes
        put_u32(&mut central_section, local_offset);
        central_section.extend_from_slice(name);
    }

    let central_offset = local_section.len() as u32;
    let central_size = central_section.len() as u32;

    let mut archive = local_section;
    archive.append(&mut central_section);

    // End of central directory.
    put_u32(&mut archive, 0x0605_4b50);
    put_u16(&mut archive, 0); // disk number
    put_u16(&mut archive, 0); // disk with central directory
    put_u16(&mut archive, entries.len() as u16);
    put_u16(&mut archive, entries.len() as u16);
    put_u32(&mut archive, central_size);
    put_u32(&mut archive, central_offset);
    put_u16(&mut archive, 0); // comment length

    archive
}
