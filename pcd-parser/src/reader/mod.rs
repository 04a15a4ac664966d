pub mod las;

use pcd_core::{
    pointcloud::point::{Chunk, PointRecord},
    ClipError,
};

/// Sequential access to the records of a point cloud, in file order.
pub trait PointReader {
    /// Number of records the source declares. Only used to estimate progress.
    fn total_count(&self) -> u64;

    fn next_point(&mut self) -> Result<Option<PointRecord>, ClipError>;
}

/// Serves records that are already in memory.
#[derive(Debug)]
pub struct MemoryPointReader {
    points: std::vec::IntoIter<PointRecord>,
    total: u64,
}

impl MemoryPointReader {
    pub fn new(points: Vec<PointRecord>) -> Self {
        let total = points.len() as u64;
        Self {
            points: points.into_iter(),
            total,
        }
    }
}

impl PointReader for MemoryPointReader {
    fn total_count(&self) -> u64 {
        self.total
    }

    fn next_point(&mut self) -> Result<Option<PointRecord>, ClipError> {
        Ok(self.points.next())
    }
}

/// Splits a [`PointReader`] into chunks of at most `chunk_size` records.
///
/// The stream is a single forward pass. After a read error it yields that
/// error once and then ends; the records already buffered for the failing
/// chunk are dropped.
pub struct ChunkedPointStream<R: PointReader> {
    reader: R,
    chunk_size: usize,
    read: u64,
    finished: bool,
}

impl<R: PointReader> ChunkedPointStream<R> {
    pub fn new(reader: R, chunk_size: usize) -> Result<Self, ClipError> {
        if chunk_size == 0 {
            return Err(ClipError::Config(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            reader,
            chunk_size,
            read: 0,
            finished: false,
        })
    }

    pub fn total_count(&self) -> u64 {
        self.reader.total_count()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks the declared point count works out to.
    pub fn expected_chunks(&self) -> u64 {
        self.total_count().div_ceil(self.chunk_size as u64)
    }

    /// Records handed out so far.
    pub fn points_read(&self) -> u64 {
        self.read
    }
}

impl<R: PointReader> Iterator for ChunkedPointStream<R> {
    type Item = Result<Chunk, ClipError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        // The declared count only sizes the buffer; it is not trusted as a limit.
        let remaining = self.total_count().saturating_sub(self.read);
        let capacity = (self.chunk_size as u64).min(remaining) as usize;
        let mut buffer = Vec::with_capacity(capacity);

        while buffer.len() < self.chunk_size {
            match self.reader.next_point() {
                Ok(Some(point)) => buffer.push(point),
                Ok(None) => {
                    self.finished = true;
                    break;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }

        if buffer.is_empty() {
            None
        } else {
            self.read += buffer.len() as u64;
            Some(Ok(buffer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<PointRecord> {
        (0..n)
            .map(|i| PointRecord {
                x: i as f64,
                y: -(i as f64),
                intensity: i as u16,
                ..Default::default()
            })
            .collect()
    }

    struct FailingReader {
        good: usize,
    }

    impl PointReader for FailingReader {
        fn total_count(&self) -> u64 {
            100
        }

        fn next_point(&mut self) -> Result<Option<PointRecord>, ClipError> {
            if self.good == 0 {
                return Err(ClipError::source_read(
                    "broken.las",
                    "read point from",
                    "unexpected end of file",
                ));
            }
            self.good -= 1;
            Ok(Some(PointRecord::default()))
        }
    }

    #[test]
    fn chunks_are_bounded_and_ordered() {
        let stream = ChunkedPointStream::new(MemoryPointReader::new(records(5)), 2).unwrap();
        assert_eq!(stream.total_count(), 5);
        assert_eq!(stream.expected_chunks(), 3);

        let chunks: Vec<Chunk> = stream.collect::<Result<_, _>>().unwrap();
        let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);

        let intensities: Vec<u16> = chunks.into_iter().flatten().map(|p| p.intensity).collect();
        assert_eq!(intensities, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_chunk() {
        let mut stream = ChunkedPointStream::new(MemoryPointReader::new(records(4)), 2).unwrap();
        assert_eq!(stream.next().unwrap().unwrap().len(), 2);
        assert_eq!(stream.next().unwrap().unwrap().len(), 2);
        assert!(stream.next().is_none());
        assert!(stream.next().is_none());
        assert_eq!(stream.points_read(), 4);
    }

    #[test]
    fn empty_source_yields_nothing() {
        let mut stream = ChunkedPointStream::new(MemoryPointReader::new(vec![]), 10).unwrap();
        assert_eq!(stream.expected_chunks(), 0);
        assert!(stream.next().is_none());
    }

    #[test]
    fn chunk_size_larger_than_source() {
        let stream = ChunkedPointStream::new(MemoryPointReader::new(records(3)), 100_000).unwrap();
        let chunks: Vec<Chunk> = stream.collect::<Result<_, _>>().unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 3);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = ChunkedPointStream::new(MemoryPointReader::new(records(3)), 0).err();
        assert!(matches!(err, Some(ClipError::Config(_))));
    }

    #[test]
    fn read_error_ends_the_stream() {
        let mut stream = ChunkedPointStream::new(FailingReader { good: 5 }, 3).unwrap();
        assert_eq!(stream.next().unwrap().unwrap().len(), 3);
        assert!(matches!(
            stream.next(),
            Some(Err(ClipError::SourceRead { .. }))
        ));
        assert!(stream.next().is_none());
        assert_eq!(stream.points_read(), 3);
    }
}
