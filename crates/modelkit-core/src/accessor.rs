//! Typed, strided views over buffer views
//!
//! An [`Accessor`] describes `count` elements of one [`AccessorType`] made of one
//! [`ComponentType`], laid out inside a [`BufferView`] starting at `byte_offset` and spaced by
//! the view's stride (or the element size when the view is tightly packed).
//!
//! [`Accessor::read`] checks the whole range once and then hands out a restartable iterator,
//! so iteration itself never fails:
//!
//! ```ignore
//! let positions: Vec<[f32; 3]> = accessor.read::<[f32; 3]>()?.collect();
//! let matrices: Vec<glam::Mat4> = accessor.read::<glam::Mat4>()?.collect();
//! ```
//!
//! The accessor does not judge whether an element type makes sense for a semantic (for
//! example integer matrices); callers that care check `component_type()` first.

use std::marker::PhantomData;
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::buffer::BufferView;
use crate::data_types::{AccessorType, ComponentType};
use crate::error::{ModelError, Result};

/// A numeric type components can be converted into.
pub trait Component: Copy + Default {
    fn read(component_type: ComponentType, normalized: bool, bytes: &[u8]) -> Self;
}

impl Component for f32 {
    fn read(component_type: ComponentType, normalized: bool, bytes: &[u8]) -> Self {
        match component_type {
            ComponentType::Float32 => LittleEndian::read_f32(bytes),
            ComponentType::Uint8 if normalized => bytes[0] as f32 / 255.0,
            ComponentType::Uint16 if normalized => LittleEndian::read_u16(bytes) as f32 / 65535.0,
            ComponentType::Uint32 if normalized => {
                LittleEndian::read_u32(bytes) as f32 / u32::MAX as f32
            }
            ComponentType::Int8 if normalized => (bytes[0] as i8 as f32 / 127.0).max(-1.0),
            ComponentType::Int16 if normalized => {
                (LittleEndian::read_i16(bytes) as f32 / 32767.0).max(-1.0)
            }
            ComponentType::Int32 if normalized => {
                (LittleEndian::read_i32(bytes) as f32 / i32::MAX as f32).max(-1.0)
            }
            ComponentType::Uint8 => bytes[0] as f32,
            ComponentType::Uint16 => LittleEndian::read_u16(bytes) as f32,
            ComponentType::Uint32 => LittleEndian::read_u32(bytes) as f32,
            ComponentType::Int8 => bytes[0] as i8 as f32,
            ComponentType::Int16 => LittleEndian::read_i16(bytes) as f32,
            ComponentType::Int32 => LittleEndian::read_i32(bytes) as f32,
        }
    }
}

impl Component for u32 {
    fn read(component_type: ComponentType, _normalized: bool, bytes: &[u8]) -> Self {
        match component_type {
            ComponentType::Uint8 => bytes[0] as u32,
            ComponentType::Uint16 => LittleEndian::read_u16(bytes) as u32,
            ComponentType::Uint32 => LittleEndian::read_u32(bytes),
            ComponentType::Int8 => bytes[0] as i8 as u32,
            ComponentType::Int16 => LittleEndian::read_i16(bytes) as u32,
            ComponentType::Int32 => LittleEndian::read_i32(bytes) as u32,
            ComponentType::Float32 => LittleEndian::read_f32(bytes) as u32,
        }
    }
}

impl Component for i32 {
    fn read(component_type: ComponentType, _normalized: bool, bytes: &[u8]) -> Self {
        match component_type {
            ComponentType::Uint8 => bytes[0] as i32,
            ComponentType::Uint16 => LittleEndian::read_u16(bytes) as i32,
            ComponentType::Uint32 => LittleEndian::read_u32(bytes) as i32,
            ComponentType::Int8 => bytes[0] as i8 as i32,
            ComponentType::Int16 => LittleEndian::read_i16(bytes) as i32,
            ComponentType::Int32 => LittleEndian::read_i32(bytes),
            ComponentType::Float32 => LittleEndian::read_f32(bytes) as i32,
        }
    }
}

/// Largest element is a 4x4 matrix.
const MAX_COMPONENTS: usize = 16;

/// A value assembled from the components of one accessor element.
pub trait Element: Sized {
    type Component: Component;
    const COMPONENTS: usize;

    fn from_components(components: &[Self::Component]) -> Self;
}

macro_rules! scalar_element {
    ($($ty:ty),*) => {
        $(
            impl Element for $ty {
                type Component = $ty;
                const COMPONENTS: usize = 1;

                fn from_components(components: &[$ty]) -> Self {
                    components[0]
                }
            }
        )*
    };
}

scalar_element!(f32, u32, i32);

impl<C: Component, const N: usize> Element for [C; N] {
    type Component = C;
    const COMPONENTS: usize = N;

    fn from_components(components: &[C]) -> Self {
        std::array::from_fn(|i| components[i])
    }
}

impl Element for Vec2 {
    type Component = f32;
    const COMPONENTS: usize = 2;

    fn from_components(c: &[f32]) -> Self {
        Vec2::new(c[0], c[1])
    }
}

impl Element for Vec3 {
    type Component = f32;
    const COMPONENTS: usize = 3;

    fn from_components(c: &[f32]) -> Self {
        Vec3::new(c[0], c[1], c[2])
    }
}

impl Element for Vec4 {
    type Component = f32;
    const COMPONENTS: usize = 4;

    fn from_components(c: &[f32]) -> Self {
        Vec4::new(c[0], c[1], c[2], c[3])
    }
}

impl Element for Quat {
    type Component = f32;
    const COMPONENTS: usize = 4;

    fn from_components(c: &[f32]) -> Self {
        Quat::from_xyzw(c[0], c[1], c[2], c[3])
    }
}

impl Element for Mat4 {
    type Component = f32;
    const COMPONENTS: usize = 16;

    /// Components are column-major.
    fn from_components(c: &[f32]) -> Self {
        let mut cols = [0.0f32; 16];
        cols.copy_from_slice(&c[..16]);
        Mat4::from_cols_array(&cols)
    }
}

/// A typed view of `count` elements inside an optional buffer view.
#[derive(Debug, Clone)]
pub struct Accessor {
    name: Option<String>,
    buffer_view: Option<Arc<BufferView>>,
    byte_offset: usize,
    component_type: ComponentType,
    accessor_type: AccessorType,
    count: usize,
    normalized: bool,
    min: Option<Vec<f32>>,
    max: Option<Vec<f32>>,
}

impl Accessor {
    pub fn new(
        buffer_view: Option<Arc<BufferView>>,
        byte_offset: usize,
        component_type: ComponentType,
        accessor_type: AccessorType,
        count: usize,
    ) -> Self {
        Self {
            name: None,
            buffer_view,
            byte_offset,
            component_type,
            accessor_type,
            count,
            normalized: false,
            min: None,
            max: None,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    pub fn with_bounds(mut self, min: Option<Vec<f32>>, max: Option<Vec<f32>>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn buffer_view(&self) -> Option<&Arc<BufferView>> {
        self.buffer_view.as_ref()
    }

    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    pub fn accessor_type(&self) -> AccessorType {
        self.accessor_type
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn normalized(&self) -> bool {
        self.normalized
    }

    pub fn min(&self) -> Option<&[f32]> {
        self.min.as_deref()
    }

    pub fn max(&self) -> Option<&[f32]> {
        self.max.as_deref()
    }

    /// Size of one element in bytes.
    pub fn element_size(&self) -> usize {
        self.accessor_type.component_count() * self.component_type.byte_length()
    }

    /// Distance between consecutive elements.
    pub fn stride(&self) -> usize {
        match &self.buffer_view {
            Some(view) if view.byte_stride() != 0 => view.byte_stride(),
            _ => self.element_size(),
        }
    }

    /// Checks that all `count` elements lie inside the buffer view.
    pub fn validate(&self) -> Result<()> {
        let view = match &self.buffer_view {
            Some(view) => view,
            None => return Ok(()),
        };
        if self.count == 0 {
            return Ok(());
        }
        let span = (self.count - 1)
            .checked_mul(self.stride())
            .and_then(|v| v.checked_add(self.element_size()));
        match span.and_then(|span| span.checked_add(self.byte_offset)) {
            Some(end) if end <= view.byte_length() => Ok(()),
            _ => Err(ModelError::bounds(
                "accessor",
                self.byte_offset,
                span.unwrap_or(usize::MAX),
                view.byte_length(),
            )),
        }
    }

    /// Returns an iterator over all elements as `E`.
    ///
    /// Fails when `E` has a different component count than the accessor type, or when the
    /// elements do not fit inside the buffer view. An accessor without a buffer view yields
    /// `count` zero elements.
    pub fn read<E: Element>(&self) -> Result<AccessorIter<'_, E>> {
        let actual = self.accessor_type.component_count();
        if E::COMPONENTS != actual {
            return Err(ModelError::AccessorTypeMismatch {
                expected: E::COMPONENTS,
                actual,
            });
        }
        self.validate()?;
        Ok(AccessorIter {
            accessor: self,
            bytes: self.buffer_view.as_ref().map(|view| view.bytes()),
            index: 0,
            _marker: PhantomData,
        })
    }

    /// Reads every element into a vector.
    pub fn read_vec<E: Element>(&self) -> Result<Vec<E>> {
        Ok(self.read::<E>()?.collect())
    }
}

/// Iterator returned by [`Accessor::read`].
pub struct AccessorIter<'a, E> {
    accessor: &'a Accessor,
    bytes: Option<&'a [u8]>,
    index: usize,
    _marker: PhantomData<fn() -> E>,
}

impl<'a, E> Clone for AccessorIter<'a, E> {
    fn clone(&self) -> Self {
        Self {
            accessor: self.accessor,
            bytes: self.bytes,
            index: self.index,
            _marker: PhantomData,
        }
    }
}

impl<'a, E: Element> Iterator for AccessorIter<'a, E> {
    type Item = E;

    fn next(&mut self) -> Option<E> {
        if self.index >= self.accessor.count {
            return None;
        }
        let mut scratch = [E::Component::default(); MAX_COMPONENTS];
        if let Some(bytes) = self.bytes {
            let component_type = self.accessor.component_type;
            let size = component_type.byte_length();
            let start = self.accessor.byte_offset + self.index * self.accessor.stride();
            for (i, slot) in scratch.iter_mut().take(E::COMPONENTS).enumerate() {
                let offset = start + i * size;
                *slot = E::Component::read(
                    component_type,
                    self.accessor.normalized,
                    &bytes[offset..offset + size],
                );
            }
        }
        self.index += 1;
        Some(E::from_components(&scratch[..E::COMPONENTS]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.accessor.count - self.index;
        (remaining, Some(remaining))
    }
}

impl<'a, E: Element> ExactSizeIterator for AccessorIter<'a, E> {}
