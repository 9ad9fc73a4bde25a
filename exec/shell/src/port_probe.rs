//! Best-effort port probe (spec §4.6): reports TCP ports bound by a process,
//! by cross-referencing the process's open socket file descriptors against
//! the kernel's TCP table. Linux-only; returns an empty result elsewhere or
//! on any read failure, since this is advisory information for the frontend,
//! never something a caller should depend on for correctness.

#[cfg(target_os = "linux")]
pub fn probe_listening_ports(pid: u32) -> Vec<u16> {
    let Some(inodes) = socket_inodes_for_pid(pid) else {
        return Vec::new();
    };
    if inodes.is_empty() {
        return Vec::new();
    }
    let mut ports = Vec::new();
    for table in ["/proc/net/tcp", "/proc/net/tcp6"] {
        if let Ok(contents) = std::fs::read_to_string(table) {
            ports.extend(parse_tcp_table(&contents, &inodes));
        }
    }
    ports.sort_unstable();
    ports.dedup();
    ports
}

#[cfg(target_os = "linux")]
fn socket_inodes_for_pid(pid: u32) -> Option<Vec<u64>> {
    let fd_dir = format!("/proc/{pid}/fd");
    let entries = std::fs::read_dir(fd_dir).ok()?;
    let mut inodes = Vec::new();
    for entry in entries.flatten() {
        if let Ok(target) = std::fs::read_link(entry.path()) {
            if let Some(name) = target.to_str() {
                if let Some(inode) = name.strip_prefix("socket:[").and_then(|s| s.strip_suffix(']')) {
                    if let Ok(inode) = inode.parse() {
                        inodes.push(inode);
                    }
                }
            }
        }
    }
    Some(inodes)
}

#[cfg(target_os = "linux")]
fn parse_tcp_table(contents: &str, inodes: &[u64]) -> Vec<u16> {
    let mut ports = Vec::new();
    for line in contents.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        // Columns: sl local_address rem_address st tx_queue:rx_queue tr:tm->when
        // retrnsmt uid timeout inode
        let Some(local) = fields.get(1) else { continue };
        let Some(inode_field) = fields.get(9) else {
            continue;
        };
        let Ok(inode) = inode_field.parse::<u64>() else {
            continue;
        };
        if !inodes.contains(&inode) {
            continue;
        }
        if let Some((_, port_hex)) = local.split_once(':') {
            if let Ok(port) = u16::from_str_radix(port_hex, 16) {
                ports.push(port);
            }
        }
    }
    ports
}

#[cfg(not(target_os = "linux"))]
pub fn probe_listening_ports(_pid: u32) -> Vec<u16> {
    Vec::new()
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn parses_a_listening_port_line() {
        let table = "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 0100007F:1F90 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 12345 1 0 0 0";
        let ports = parse_tcp_table(table, &[12345]);
        assert_eq!(ports, vec![8080]);
    }

    #[test]
    fn unmatched_inode_is_ignored() {
        let table = "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 0100007F:1F90 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 99999 1 0 0 0";
        assert!(parse_tcp_table(table, &[12345]).is_empty());
    }
}
