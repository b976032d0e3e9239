// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Root container sizing.
//!
//! The host mapping library refuses to render into a container without a
//! size. [`resolve`] decides how the container gets one, in order:
//!
//! 1. An explicit styled width *and* height: keep them.
//! 2. Projected `max_bounds` corners: a fixed pixel size equal to the
//!    projected extents.
//! 3. Otherwise fill the parent element. Without a parent this fails with
//!    [`Error::UnsizedContainer`]; a parent smaller than the configured
//!    minimum in either dimension is reported but still used.

use kurbo::{Point, Rect, Size};

use crate::error::Error;

/// What is known about the root container's surroundings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SizeHints {
    /// Explicit styled size, when both width and height are set.
    pub style: Option<Size>,
    /// The root's maximum bounds, projected to container pixels
    /// (north-west corner, south-east corner).
    pub max_bounds: Option<(Point, Point)>,
    /// Client size of the container's parent element, if there is one.
    pub parent: Option<Size>,
}

/// How the container should be sized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContainerSize {
    /// Leave the container's styled size alone.
    AsStyled,
    /// A fixed size in pixels.
    Fixed(Size),
    /// Stretch to 100% of the parent element.
    FillParent,
}

/// Outcome of [`resolve`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeResolution {
    /// The sizing to apply.
    pub size: ContainerSize,
    /// Set when filling a parent smaller than the minimum extent.
    pub undersized_parent: Option<Size>,
}

/// Resolves the container size from `hints`.
///
/// `min_extent` is the smallest parent dimension, in pixels, considered
/// sensible before a warning is raised.
pub fn resolve(hints: &SizeHints, min_extent: f64) -> Result<SizeResolution, Error> {
    if hints.style.is_some() {
        return Ok(SizeResolution {
            size: ContainerSize::AsStyled,
            undersized_parent: None,
        });
    }
    if let Some((nw, se)) = hints.max_bounds {
        return Ok(SizeResolution {
            size: ContainerSize::Fixed(Rect::from_points(nw, se).size()),
            undersized_parent: None,
        });
    }
    let parent = hints.parent.ok_or(Error::UnsizedContainer)?;
    let undersized = parent.width < min_extent || parent.height < min_extent;
    Ok(SizeResolution {
        size: ContainerSize::FillParent,
        undersized_parent: undersized.then_some(parent),
    })
}
