//! Fixed-format parsing of classic netperf output.
//!
//! The text layout is an external contract owned by netperf itself: a banner
//! line naming the test, a column-header block, then one or more data rows.
//! Only the first complete data row is taken; the trailing remote-side row
//! printed by UDP_STREAM and RR tests has fewer columns and is ignored.

use crate::{RunRecord, TestType};
use anyhow::{anyhow, Result};

/// Parse the content of one netperf log file into a run record.
///
/// `source` is the originating file name; it is carried into the record and
/// used for error context and round-number recovery.
pub fn parse_log(content: &str, source: &str) -> Result<RunRecord> {
    let test_type = detect_test_type(content)
        .ok_or_else(|| anyhow!("{}: no recognizable netperf test banner", source))?;

    let fields = first_data_row(content, expected_fields(test_type))
        .ok_or_else(|| anyhow!("{}: no data row found for {} output", source, test_type))?;

    // Column positions per test type, fixed by netperf's output format:
    //   stream:     recv_sock send_sock msg_size elapsed throughput
    //   udp stream: sock msg_size elapsed ok errors throughput
    //   rr:         send_sock recv_sock req_size resp_size elapsed rate
    let (socket_size, message_size, elapsed_secs, value) = match test_type {
        TestType::TcpStream | TestType::TcpMaerts => {
            (fields[1], fields[2], fields[3], fields[4])
        }
        TestType::UdpStream => (fields[0], fields[1], fields[2], fields[5]),
        TestType::TcpRr | TestType::UdpRr => (fields[0], fields[2], fields[4], fields[5]),
    };

    Ok(RunRecord {
        test_type,
        direction: test_type.direction(),
        socket_size: socket_size as u64,
        message_size: message_size as u64,
        elapsed_secs,
        value,
        unit: test_type.unit().to_string(),
        round: round_from_name(source),
        source: source.to_string(),
    })
}

/// Identify the test type from the banner line.
fn detect_test_type(content: &str) -> Option<TestType> {
    for line in content.lines() {
        if !line.contains("TEST") {
            continue;
        }
        if line.contains("TCP STREAM TEST") {
            return Some(TestType::TcpStream);
        }
        if line.contains("TCP MAERTS TEST") {
            return Some(TestType::TcpMaerts);
        }
        if line.contains("UDP UNIDIRECTIONAL SEND TEST") || line.contains("UDP STREAM TEST") {
            return Some(TestType::UdpStream);
        }
        if line.contains("TCP REQUEST/RESPONSE TEST") {
            return Some(TestType::TcpRr);
        }
        if line.contains("UDP REQUEST/RESPONSE TEST") {
            return Some(TestType::UdpRr);
        }
    }
    None
}

/// Number of columns in the first data row for a given test type.
fn expected_fields(test_type: TestType) -> usize {
    match test_type {
        TestType::TcpStream | TestType::TcpMaerts => 5,
        TestType::UdpStream => 6,
        TestType::TcpRr | TestType::UdpRr => 6,
    }
}

/// Find the first line consisting of exactly `count` numeric fields.
fn first_data_row(content: &str, count: usize) -> Option<Vec<f64>> {
    for line in content.lines() {
        let fields: Vec<f64> = line
            .split_whitespace()
            .map(|t| t.parse::<f64>())
            .collect::<Result<_, _>>()
            .unwrap_or_default();
        if fields.len() == count {
            return Some(fields);
        }
    }
    None
}

/// Recover a round number from a file name containing `round<N>`.
///
/// The collector encodes the round in the log name (e.g.
/// `tcp_stream-16384-round2.log`); logs without the token get no round.
pub fn round_from_name(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let idx = lower.find("round")?;
    let digits: String = lower[idx + 5..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;

    const TCP_STREAM_LOG: &str = "\
MIGRATED TCP STREAM TEST from 0.0.0.0 (0.0.0.0) port 0 AF_INET to 192.168.0.2 () port 0 AF_INET
Recv   Send    Send
Socket Socket  Message  Elapsed
Size   Size    Size     Time     Throughput
bytes  bytes   bytes    secs.    10^6bits/sec

 87380  16384  16384    10.00    9413.11
";

    const UDP_STREAM_LOG: &str = "\
MIGRATED UDP UNIDIRECTIONAL SEND TEST from 0.0.0.0 (0.0.0.0) port 0 AF_INET to 192.168.0.2 () port 0 AF_INET
Socket  Message  Elapsed      Messages
Size    Size     Time         Okay Errors   Throughput
bytes   bytes    secs            #      #   10^6bits/sec

212992    1024   10.00      919354      0     753.20
212992           10.00      918614            752.59
";

    const TCP_RR_LOG: &str = "\
MIGRATED TCP REQUEST/RESPONSE TEST from 0.0.0.0 (0.0.0.0) port 0 AF_INET to 192.168.0.2 () port 0 AF_INET : first burst 0
Local /Remote
Socket Size   Request  Resp.   Elapsed  Trans.
Send   Recv   Size     Size    Time     Rate
bytes  Bytes  bytes    bytes   secs.    per sec

16384  87380  1        1       10.00    23933.56
16384  87380
";

    #[test]
    fn parses_tcp_stream() {
        let record = parse_log(TCP_STREAM_LOG, "tcp_stream.log").unwrap();
        assert_eq!(record.test_type, TestType::TcpStream);
        assert_eq!(record.direction, Direction::Send);
        assert_eq!(record.socket_size, 16384);
        assert_eq!(record.message_size, 16384);
        assert_eq!(record.elapsed_secs, 10.00);
        assert_eq!(record.value, 9413.11);
        assert_eq!(record.unit, "Mbits/s");
        assert_eq!(record.round, None);
    }

    #[test]
    fn parses_udp_stream_send_side() {
        let record = parse_log(UDP_STREAM_LOG, "udp_stream-round3.log").unwrap();
        assert_eq!(record.test_type, TestType::UdpStream);
        assert_eq!(record.socket_size, 212992);
        assert_eq!(record.message_size, 1024);
        // The local send line carries the measurement, not the remote line.
        assert_eq!(record.value, 753.20);
        assert_eq!(record.round, Some(3));
    }

    #[test]
    fn parses_tcp_rr() {
        let record = parse_log(TCP_RR_LOG, "tcp_rr.log").unwrap();
        assert_eq!(record.test_type, TestType::TcpRr);
        assert_eq!(record.direction, Direction::Bidir);
        assert_eq!(record.socket_size, 16384);
        assert_eq!(record.message_size, 1);
        assert_eq!(record.value, 23933.56);
        assert_eq!(record.unit, "trans/s");
    }

    #[test]
    fn rejects_unknown_banner() {
        let err = parse_log("OMNI Send TEST from 0.0.0.0\n", "omni.log").unwrap_err();
        assert!(err.to_string().contains("no recognizable netperf test banner"));
    }

    #[test]
    fn rejects_truncated_log() {
        let truncated = "MIGRATED TCP STREAM TEST from 0.0.0.0\nRecv   Send    Send\n";
        let err = parse_log(truncated, "truncated.log").unwrap_err();
        assert!(err.to_string().contains("no data row"));
    }

    #[test]
    fn round_token_extraction() {
        assert_eq!(round_from_name("tcp_stream-16384-round2.log"), Some(2));
        assert_eq!(round_from_name("udp_rr.Round12.netperf"), Some(12));
        assert_eq!(round_from_name("tcp_stream.log"), None);
        assert_eq!(round_from_name("roundtrip.log"), None);
    }
}
