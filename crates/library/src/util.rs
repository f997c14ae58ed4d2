use num_traits::PrimInt;

/// Rounds `value` up to the next multiple of `alignment`, which must be a power of two.
pub fn align_up<T: PrimInt>(value: T, alignment: T) -> T {
  (value + alignment - T::one()) & !(alignment - T::one())
}
