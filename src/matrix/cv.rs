use opencv::core::{
    self, MatTraitConst, MatTraitConstManual, MatTraitManual, CV_16S, CV_16U, CV_32F, CV_32S,
    CV_64F, CV_8S, CV_8U,
};

use super::{Depth, MatBuffer};

impl Depth {
    pub const fn from_cv_depth(depth: i32) -> Option<Self> {
        match depth {
            CV_8U => Some(Self::U8),
            CV_8S => Some(Self::S8),
            CV_16U => Some(Self::U16),
            CV_16S => Some(Self::S16),
            CV_32S => Some(Self::S32),
            CV_32F => Some(Self::F32),
            CV_64F => Some(Self::F64),
            _ => None,
        }
    }
}

impl MatBuffer for core::Mat {
    fn rows(&self) -> usize {
        usize::try_from(MatTraitConst::rows(self)).unwrap_or(0)
    }

    fn cols(&self) -> usize {
        usize::try_from(MatTraitConst::cols(self)).unwrap_or(0)
    }

    fn depth(&self) -> Option<Depth> {
        Depth::from_cv_depth(MatTraitConst::depth(self))
    }

    fn channels(&self) -> usize {
        usize::try_from(MatTraitConst::channels(self)).unwrap_or(0)
    }

    fn data(&self) -> Option<&[u8]> {
        if !self.is_continuous() {
            return None;
        }
        self.data_bytes().ok()
    }

    fn data_mut(&mut self) -> Option<&mut [u8]> {
        if !self.is_continuous() {
            return None;
        }
        self.data_bytes_mut().ok()
    }
}
