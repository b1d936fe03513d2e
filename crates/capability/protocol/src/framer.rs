//! 行分帧
//!
//! 把 TCP 字节流按 `\r` 切分为协议行；未收到分隔符的尾部保留到下一块。
//! 单行长度有上限：超限时报告一次 [`FrameError::LineTooLong`]，
//! 丢弃已缓冲字节并跳过直到下一个 `\r`。

/// 协议行分隔符
pub const LINE_DELIMITER: u8 = b'\r';

/// 分帧错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("line of {len} bytes exceeds limit of {max} bytes")]
    LineTooLong { len: usize, max: usize },
}

/// `\r` 行分帧器
#[derive(Debug)]
pub struct LineFramer {
    buffer: Vec<u8>,
    max_line_len: usize,
    /// 超限后丢弃到下一个分隔符
    discarding: bool,
}

impl LineFramer {
    pub fn new(max_line_len: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_line_len,
            discarding: false,
        }
    }

    /// 追加一块原始字节
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// 取出下一条完整行（不含分隔符）；没有完整行时返回 `Ok(None)`。
    pub fn next_line(&mut self) -> Result<Option<String>, FrameError> {
        loop {
            let Some(index) = self.buffer.iter().position(|byte| *byte == LINE_DELIMITER) else {
                if self.discarding {
                    self.buffer.clear();
                } else if self.buffer.len() > self.max_line_len {
                    let len = self.buffer.len();
                    self.buffer.clear();
                    self.discarding = true;
                    return Err(FrameError::LineTooLong {
                        len,
                        max: self.max_line_len,
                    });
                }
                return Ok(None);
            };

            let frame: Vec<u8> = self.buffer.drain(..=index).collect();
            if self.discarding {
                self.discarding = false;
                continue;
            }
            if index > self.max_line_len {
                return Err(FrameError::LineTooLong {
                    len: index,
                    max: self.max_line_len,
                });
            }
            return Ok(Some(String::from_utf8_lossy(&frame[..index]).into_owned()));
        }
    }

    /// 已缓冲但尚未成行的字节数
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }
}
