//! Tiny ONNX graphs serialised by hand for session tests

use std::path::{Path, PathBuf};

/// Minimal protobuf writer, enough for ModelProto and its children
#[derive(Default)]
struct Proto(Vec<u8>);

impl Proto {
    fn varint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.0.push((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.0.push(value as u8);
    }

    fn int(mut self, field: u64, value: u64) -> Self {
        self.varint(field << 3);
        self.varint(value);
        self
    }

    fn bytes(mut self, field: u64, bytes: &[u8]) -> Self {
        self.varint((field << 3) | 2);
        self.varint(bytes.len() as u64);
        self.0.extend_from_slice(bytes);
        self
    }

    fn message(self, field: u64, message: Proto) -> Self {
        self.bytes(field, &message.0)
    }
}

const FLOAT: u64 = 1;

/// ValueInfoProto for a float `[N, channels, H, W]` tensor
fn float_tensor(name: &str, channels: u64) -> Proto {
    let symbolic = |param: &str| Proto::default().bytes(2, param.as_bytes());
    let shape = Proto::default()
        .message(1, symbolic("N"))
        .message(1, Proto::default().int(1, channels))
        .message(1, symbolic("H"))
        .message(1, symbolic("W"));
    let tensor_type = Proto::default().int(1, FLOAT).message(2, shape);

    Proto::default()
        .bytes(1, name.as_bytes())
        .message(2, Proto::default().message(1, tensor_type))
}

/// Graph computing `noise = x * scale` for `x: [N, channels, H, W]`
pub fn scale_graph(scale: f32, channels: u64) -> Vec<u8> {
    let initializer = Proto::default()
        .int(2, FLOAT)
        .bytes(8, b"scale")
        .bytes(9, &scale.to_le_bytes());
    let node = Proto::default()
        .bytes(1, b"x")
        .bytes(1, b"scale")
        .bytes(2, b"noise")
        .bytes(3, b"mul")
        .bytes(4, b"Mul");
    let graph = Proto::default()
        .message(1, node)
        .bytes(2, b"scaled")
        .message(5, initializer)
        .message(11, float_tensor("x", channels))
        .message(12, float_tensor("noise", channels));

    Proto::default()
        .int(1, 7)
        .message(8, Proto::default().int(2, 13))
        .message(7, graph)
        .0
}

/// Write [`scale_graph`] to `dir/name` and return its path
pub fn write_scale_graph(dir: &Path, name: &str, scale: f32, channels: u64) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, scale_graph(scale, channels)).unwrap();
    path
}
