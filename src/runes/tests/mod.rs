// Tests for rune page editing
