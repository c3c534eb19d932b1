use crate::numbers::Float;
use crate::{max, min};
use num_traits::Zero;
use std::ops::{Add, Div, Index, Mul, Neg, Sub};

//
// Vec2
//

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vec2<T: Copy> {
    pub x: T,
    pub y: T,
}

impl<T: Zero + Copy> Vec2<T> {
    pub fn zero() -> Self {
        Vec2 {
            x: T::zero(),
            y: T::zero(),
        }
    }
}

impl<T: Mul<Output = T> + Copy> Vec2<T> {
    pub fn scale(self, s: T) -> Self {
        Vec2 {
            x: self.x * s,
            y: self.y * s,
        }
    }

    /// Multiplies the components together (x * y), e.g. the area of a resolution.
    pub fn product(self) -> T {
        self.x * self.y
    }
}

impl<T: Add<Output = T> + Copy> Add for Vec2<T> {
    type Output = Vec2<T>;

    fn add(self, o: Vec2<T>) -> Self {
        Vec2 {
            x: self.x + o.x,
            y: self.y + o.y,
        }
    }
}

//
// Vec3
//

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vec3<T: Copy> {
    pub x: T,
    pub y: T,
    pub z: T,
}

pub type Vec3d = Vec3<f64>;

impl<T: Copy> Vec3<T> {
    pub fn new(x: T, y: T, z: T) -> Self {
        Vec3 { x, y, z }
    }
}

impl<T: Zero + Copy> Vec3<T> {
    pub fn zero() -> Self {
        Vec3 {
            x: T::zero(),
            y: T::zero(),
            z: T::zero(),
        }
    }
}

impl<T: Mul<Output = T> + Add<Output = T> + Copy> Vec3<T> {
    pub fn dot(self, o: Vec3<T>) -> T {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    pub fn length2(self) -> T {
        self.dot(self)
    }
}

impl<T: Mul<Output = T> + Copy> Vec3<T> {
    /// Multiplies every component by `s`.
    pub fn scale(self, s: T) -> Self {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }
}

impl<T: Div<Output = T> + Copy> Vec3<T> {
    /// Divides every component by `s`.
    pub fn div_scale(self, s: T) -> Self {
        Vec3 {
            x: self.x / s,
            y: self.y / s,
            z: self.z / s,
        }
    }
}

impl<T: Mul<Output = T> + Sub<Output = T> + Copy> Vec3<T> {
    pub fn cross(self, o: Vec3<T>) -> Self {
        Vec3 {
            x: self.y * o.z - self.z * o.y,
            y: self.z * o.x - self.x * o.z,
            z: self.x * o.y - self.y * o.x,
        }
    }
}

impl<T: Float> Vec3<T> {
    pub fn length(self) -> T {
        self.length2().sqrt()
    }

    /// Returns the unit vector. A zero vector stays zero instead of becoming NaN.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == T::zero() {
            self
        } else {
            self.div_scale(len)
        }
    }

    /// Flips the vector so that it lies in the same hemisphere as `refv`.
    pub fn align(self, refv: Vec3<T>) -> Self {
        if refv.dot(self) < T::zero() {
            -self
        } else {
            self
        }
    }
}

impl<T: PartialOrd + Copy> Vec3<T> {
    pub fn min(self, o: Self) -> Self {
        Vec3 {
            x: min(self.x, o.x),
            y: min(self.y, o.y),
            z: min(self.z, o.z),
        }
    }

    pub fn max(self, o: Self) -> Self {
        Vec3 {
            x: max(self.x, o.x),
            y: max(self.y, o.y),
            z: max(self.z, o.z),
        }
    }
}

impl<T: Add<Output = T> + Copy> Add for Vec3<T> {
    type Output = Vec3<T>;

    fn add(self, o: Vec3<T>) -> Self {
        Vec3 {
            x: self.x + o.x,
            y: self.y + o.y,
            z: self.z + o.z,
        }
    }
}

impl<T: Sub<Output = T> + Copy> Sub for Vec3<T> {
    type Output = Vec3<T>;

    fn sub(self, o: Vec3<T>) -> Self {
        Vec3 {
            x: self.x - o.x,
            y: self.y - o.y,
            z: self.z - o.z,
        }
    }
}

// Component-wise product:
impl<T: Mul<Output = T> + Copy> Mul for Vec3<T> {
    type Output = Vec3<T>;

    fn mul(self, o: Vec3<T>) -> Self {
        Vec3 {
            x: self.x * o.x,
            y: self.y * o.y,
            z: self.z * o.z,
        }
    }
}

impl<T: Copy> Index<usize> for Vec3<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Index out of range for Vec3"),
        }
    }
}

impl<T: Neg<Output = T> + Copy> Neg for Vec3<T> {
    type Output = Vec3<T>;

    fn neg(self) -> Self {
        Vec3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

//
// Vec4
//

// Only used as the rows of a matrix:
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vec4<T: Copy> {
    pub x: T,
    pub y: T,
    pub z: T,
    pub w: T,
}

impl<T: Copy> Vec4<T> {
    pub fn from_vec3(v: Vec3<T>, w: T) -> Self {
        Vec4 {
            x: v.x,
            y: v.y,
            z: v.z,
            w,
        }
    }
}

impl<T: Mul<Output = T> + Add<Output = T> + Copy> Vec4<T> {
    /// Performs a dot product assuming o's w component is 1
    pub fn dot_one(self, o: Vec3<T>) -> T {
        self.x * o.x + self.y * o.y + self.z * o.z + self.w
    }

    /// Performs a dot product assuming o's w component is 0
    pub fn dot_zero(self, o: Vec3<T>) -> T {
        self.x * o.x + self.y * o.y + self.z * o.z
    }
}

impl<T: Copy> Index<usize> for Vec4<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            3 => &self.w,
            _ => panic!("Index out of range for Vec4"),
        }
    }
}
